//! Cut-outs drawn over a scrolling logo with a multiplicative mask pass
//! followed by an additive image pass.
//!
//! Space switches between the two scenes and `M` toggles masking.

use anyhow::Context;
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, QuadUniforms};
use nehe::{AppConfig, Filter, Frame, KeyCode, Lesson, Mtx, NeHeContext, NeHeError, UniformRing, wgpu};

/// `dst * src`: white mask texels keep the background, black ones clear it.
const MASK_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Dst,
        dst_factor: wgpu::BlendFactor::Zero,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Dst,
        dst_factor: wgpu::BlendFactor::Zero,
        operation: wgpu::BlendOperation::Add,
    },
};

const ADD_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scene {
    /// A tiled image scrolling sideways.
    Scroll,
    /// A single image spinning in the middle.
    Spin,
}

impl Scene {
    fn toggled(self) -> Self {
        match self {
            Scene::Scroll => Scene::Spin,
            Scene::Spin => Scene::Scroll,
        }
    }
}

fn background(projection: Mtx, animate: f32) -> QuadUniforms {
    QuadUniforms {
        mvp: projection * Mtx::translation(0.0, 0.0, -2.0),
        uv_offset: [0.0, -animate],
        uv_scale: [3.0, 3.0],
    }
}

fn overlay(projection: Mtx, scene: Scene, animate: f32) -> QuadUniforms {
    match scene {
        Scene::Scroll => QuadUniforms {
            mvp: projection * Mtx::translation(0.0, 0.0, -2.0),
            uv_offset: [animate, 0.0],
            uv_scale: [4.0, 4.0],
        },
        Scene::Spin => {
            let mut model = Mtx::translation(0.0, 0.0, -3.0);
            model.rotate(360.0 * animate, 0.0, 0.0, 1.0);
            QuadUniforms {
                mvp: projection * model,
                uv_offset: [0.0, 0.0],
                uv_scale: [1.0, 1.0],
            }
        }
    }
}

const CLEAR: wgpu::Color = wgpu::Color::TRANSPARENT;

/// A mask and the image it cuts out.
struct Overlay {
    mask: wgpu::BindGroup,
    image: wgpu::BindGroup,
}

struct Lesson20 {
    opaque_pipeline: wgpu::RenderPipeline,
    mask_pipeline: wgpu::RenderPipeline,
    image_pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<QuadUniforms>,
    logo: wgpu::BindGroup,
    scroll: Overlay,
    spin: Overlay,
    projection: Mtx,
    scene: Scene,
    masking: bool,
    animate: f32,
}

impl Lesson for Lesson20 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Masking Tutorial")
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 20 Shader", shaders::QUAD);
        let uniforms = UniformRing::new(&ctx.gpu, 3, "Lesson 20 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 20 Texture");

        let builder = |label: &'static str| {
            PipelineBuilder::new(label, &shader, ctx.surface_format())
                .bind_group(uniforms.layout())
                .bind_group(&texture_layout)
                .topology(wgpu::PrimitiveTopology::TriangleStrip)
        };
        let opaque_pipeline = builder("Lesson 20 Opaque Pipeline").build(device);
        let mask_pipeline = builder("Lesson 20 Mask Pipeline")
            .blend(MASK_BLENDING)
            .build(device);
        let image_pipeline = builder("Lesson 20 Image Pipeline")
            .blend(ADD_BLENDING)
            .build(device);

        let sampler = ctx.create_sampler(Filter::Linear);
        let bind = |path: &str| -> Result<wgpu::BindGroup, NeHeError> {
            let texture = ctx.load_texture(path, true, false)?;
            Ok(pipeline::texture_bind_group(
                device,
                &texture_layout,
                &texture.view,
                &sampler,
            ))
        };
        let logo = bind("Data/Logo.bmp")?;
        let scroll = Overlay {
            mask: bind("Data/Mask1.bmp")?,
            image: bind("Data/Image1.bmp")?,
        };
        let spin = Overlay {
            mask: bind("Data/Mask2.bmp")?,
            image: bind("Data/Image2.bmp")?,
        };

        Ok(Self {
            opaque_pipeline,
            mask_pipeline,
            image_pipeline,
            uniforms,
            logo,
            scroll,
            spin,
            projection: Mtx::IDENTITY,
            scene: Scene::Scroll,
            masking: true,
            animate: 0.0,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        self.uniforms.reset();
        let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 20 Pass");

        pass.set_pipeline(&self.opaque_pipeline);
        pass.set_bind_group(1, &self.logo, &[]);
        let uniforms = background(self.projection, self.animate);
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &uniforms);
        pass.draw(0..4, 0..1);

        let uniforms = overlay(self.projection, self.scene, self.animate);
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &uniforms);
        let cutout = match self.scene {
            Scene::Scroll => &self.scroll,
            Scene::Spin => &self.spin,
        };
        if self.masking {
            pass.set_pipeline(&self.mask_pipeline);
            pass.set_bind_group(1, &cutout.mask, &[]);
            pass.draw(0..4, 0..1);
        }
        pass.set_pipeline(&self.image_pipeline);
        pass.set_bind_group(1, &cutout.image, &[]);
        pass.draw(0..4, 0..1);

        self.animate = (self.animate + 0.002) % 1.0;
    }

    fn key(&mut self, _ctx: &mut NeHeContext, key: KeyCode, down: bool, repeat: bool) {
        if !down || repeat {
            return;
        }
        match key {
            KeyCode::Space => self.scene = self.scene.toggled(),
            KeyCode::KeyM => self.masking = !self.masking,
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson20>().context("lesson 20 failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_scrolls_upwards() {
        let u = background(Mtx::IDENTITY, 0.25);
        assert_eq!(u.uv_offset, [0.0, -0.25]);
        assert_eq!(u.uv_scale, [3.0, 3.0]);
    }

    #[test]
    fn scroll_overlay_shares_the_background_plane() {
        let projection = Mtx::perspective(45.0, 4.0 / 3.0, 0.1, 100.0);
        let u = overlay(projection, Scene::Scroll, 0.5);
        assert_eq!(u.mvp, background(projection, 0.5).mvp);
        assert_eq!(u.uv_offset, [0.5, 0.0]);
        assert_eq!(u.uv_scale, [4.0, 4.0]);
    }

    #[test]
    fn spin_overlay_sits_behind_the_background() {
        let u = overlay(Mtx::IDENTITY, Scene::Spin, 0.0);
        assert_eq!(u.mvp, Mtx::translation(0.0, 0.0, -3.0));
        assert_eq!(u.uv_scale, [1.0, 1.0]);
    }

    #[test]
    fn space_alternates_scenes() {
        assert_eq!(Scene::Scroll.toggled(), Scene::Spin);
        assert_eq!(Scene::Spin.toggled().toggled(), Scene::Spin);
    }
}
