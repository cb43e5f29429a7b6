//! Logger setup shared by every lesson binary.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the global `env_logger` once; later calls do nothing.
///
/// `RUST_LOG` overrides the default `info` level. The GPU stack is held at
/// `warn` unless `RUST_LOG` names it.
pub fn init() {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(log::LevelFilter::Info)
            .filter_module("wgpu_core", log::LevelFilter::Warn)
            .filter_module("wgpu_hal", log::LevelFilter::Warn)
            .filter_module("naga", log::LevelFilter::Warn);

        if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        }

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
        log::info!("still alive");
    }
}
