use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber. `RUST_LOG` takes precedence over `default_filter`.
pub fn init(default_filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| err as Box<dyn std::error::Error>)
}

#[cfg(test)]
mod test {
    use super::*;

    // same shape as the binaries' `main`
    fn start() -> Result<(), Box<dyn std::error::Error>> {
        init("warn")?;
        Ok(())
    }

    #[test]
    fn test_second_init_is_an_error() {
        let _ = start();
        assert!(start().is_err());
    }
}
