use std::path::PathBuf;

use bundlewise_core::chrono::{DateTime, Utc};
use bundlewise_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use bundlewise_core::{ApplicationError, BasketSanitizer, BundleMiningEngine, DomainError};
use bundlewise_store::{
    BundleRefresh, InMemorySuggestionStore, JsonFileOrderSource, JsonFileSuggestionStore,
    OrderWindow, RefreshOutcome, ShopId, SuggestionStore,
};

use crate::commands::CommandResult;
use crate::logging;

pub const DEFAULT_SHOP: &str = "default";

#[derive(Clone, Debug, Default)]
pub struct MineArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub shop: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

pub fn run(args: MineArgs) -> CommandResult {
    let options = LoadOptions {
        require_file: args.config_path.is_some(),
        config_path: args.config_path.clone(),
        overrides: args.overrides.clone(),
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return failure(ApplicationError::Configuration(error.to_string())),
    };
    logging::init(&config.logging);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "mine",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let shop_id = ShopId(args.shop.clone().unwrap_or_else(|| DEFAULT_SHOP.to_string()));
    let window = OrderWindow { since: args.since, until: args.until };

    runtime.block_on(mine_shop(&config, &args, &shop_id, window)).unwrap_or_else(failure)
}

fn failure(error: ApplicationError) -> CommandResult {
    let (error_class, exit_code) = classify(&error);
    let correlation_id = format!("mine-{}", Utc::now().format("%Y%m%dT%H%M%S%3fZ"));
    CommandResult::interface_failure(
        "mine",
        error_class,
        &error.into_interface(correlation_id),
        exit_code,
    )
}

async fn mine_shop(
    config: &AppConfig,
    args: &MineArgs,
    shop_id: &ShopId,
    window: OrderWindow,
) -> Result<CommandResult, ApplicationError> {
    let source = JsonFileOrderSource::new(&args.input);
    let sanitizer = BasketSanitizer::new(
        config.sanitation.max_basket_size,
        config.sanitation.drop_empty_baskets,
    );
    let engine = BundleMiningEngine::new(config.mining.parameters())?;

    match &args.output {
        Some(path) => {
            let store = JsonFileSuggestionStore::new(path);
            let outcome = BundleRefresh::new(&source, &store, sanitizer, engine)
                .refresh_shop(shop_id, window)
                .await?;
            Ok(CommandResult::success("mine", summarize(&outcome, &path.display().to_string())))
        }
        None => {
            let store = InMemorySuggestionStore::default();
            BundleRefresh::new(&source, &store, sanitizer, engine)
                .refresh_shop(shop_id, window)
                .await?;
            let suggestions =
                store.list_for_shop(shop_id).await.map_err(|error| error.into_sink_error())?;
            let rendered = serde_json::to_string_pretty(&suggestions)
                .map_err(|error| ApplicationError::Sink(error.to_string()))?;
            Ok(CommandResult::document(rendered))
        }
    }
}

fn summarize(outcome: &RefreshOutcome, destination: &str) -> String {
    format!(
        "shop `{}`: {} suggestions for {} anchors from {} baskets ({} truncated) written to {}",
        outcome.shop_id,
        outcome.stats.suggestions,
        outcome.stats.anchors,
        outcome.sanitation.output_baskets,
        outcome.sanitation.truncated,
        destination
    )
}

fn classify(error: &ApplicationError) -> (&'static str, u8) {
    match error {
        ApplicationError::Source(_) => ("order_source", 4),
        ApplicationError::Domain(DomainError::InvalidParameter { .. }) => ("config_validation", 2),
        ApplicationError::Domain(_) => ("mining", 5),
        ApplicationError::Sink(_) => ("suggestion_sink", 6),
        ApplicationError::Configuration(_) => ("config_validation", 2),
    }
}
