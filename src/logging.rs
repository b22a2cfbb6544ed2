use tracing_subscriber::EnvFilter;

const CRATE_TARGETS: &[&str] = &[
    "hydrobox",
    "hydrobox_core",
    "hydrobox_plotting",
    "hydrobox_discharge",
    "hydrobox_signal",
    "hydrobox_preprocessing",
    "hydrobox_stats",
    "hydrobox_sample",
    "hydrobox_geostat",
    "hydrobox_io",
    "hydrobox_polars",
];

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `target=level` directives for every hydrobox crate
pub fn default_filter(verbosity: u8) -> String {
    let level = level(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install a fmt subscriber unless one is already set; `RUST_LOG` wins over
/// `verbosity`.
pub fn init(verbosity: u8) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_covers_every_crate() {
        let filter = default_filter(2);
        assert_eq!(filter.split(',').count(), CRATE_TARGETS.len());
        assert!(filter.contains("hydrobox_geostat=debug"));
        assert!(default_filter(9).starts_with("hydrobox=trace"));
    }

    #[test]
    fn test_levels_and_repeated_init() {
        assert_eq!(default_filter(0).split(',').next(), Some("hydrobox=warn"));
        assert!(default_filter(1).contains("hydrobox_io=info"));
        init(0);
        assert!(!init(3));
    }
}
