use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ログ初期化。`RUST_LOG` があればそれを優先する
pub fn init(verbose: bool) {
    let default_filter = if verbose { "baxathon=debug" } else { "baxathon=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
