use super::{
    ActivationResolver, ActivationResult, EvaluationContext, ExclusionRequest, ModuleCatalog,
    ModuleDescriptor,
};
use crate::config::ConfigService;
use crate::discovery::{AUTO_MODULE_KEY, DiscoveryError, FactoriesLoader, FactoryRegistry};
use crate::error::Result;

/// Selects the auto modules for one application run
///
/// Combines discovery (which modules exist), configuration (which are turned
/// off) and resolution (which apply here, and in what order).
///
/// # Example
///
/// ```
/// use meshestra_boot::autoconfigure::{
///     AutoConfigurationSelector, ExclusionRequest, ModuleDescriptor, StaticEnvironment,
/// };
/// use meshestra_boot::config::ConfigService;
/// use meshestra_boot::discovery::{FactoriesLoader, FactoryRegistry};
///
/// let mut loader = FactoriesLoader::new();
/// loader.parse_source("app", "meshestra.boot.AutoModule=app::WebModule").unwrap();
///
/// let mut modules = FactoryRegistry::new();
/// modules.register("app::WebModule", || ModuleDescriptor::new("app::WebModule"));
///
/// let selector = AutoConfigurationSelector::new(loader, modules);
/// let result = selector
///     .select(&ExclusionRequest::new(), &ConfigService::default(), &StaticEnvironment::new())
///     .unwrap();
///
/// assert_eq!(result.modules(), ["app::WebModule"]);
/// ```
#[derive(Debug)]
pub struct AutoConfigurationSelector {
    loader: FactoriesLoader,
    modules: FactoryRegistry<ModuleDescriptor>,
    resolver: ActivationResolver,
}

impl AutoConfigurationSelector {
    pub fn new(loader: FactoriesLoader, modules: FactoryRegistry<ModuleDescriptor>) -> Self {
        Self {
            loader,
            modules,
            resolver: ActivationResolver::new(),
        }
    }

    /// Every discovered candidate, in discovery order
    pub fn catalog(&self) -> std::result::Result<ModuleCatalog, DiscoveryError> {
        let names = self.loader.load_names(AUTO_MODULE_KEY);
        let descriptors = self.modules.instantiate(AUTO_MODULE_KEY, &names)?;
        Ok(descriptors.into_iter().collect())
    }

    /// Select and order the auto modules to activate
    ///
    /// Names excluded through configuration are merged into `request` as
    /// loosely-bound names. When auto configuration is disabled the result is
    /// empty and discovery is not consulted.
    pub fn select(
        &self,
        request: &ExclusionRequest,
        config: &ConfigService,
        environment: &dyn EvaluationContext,
    ) -> Result<ActivationResult> {
        if !config.auto_configuration_enabled() {
            tracing::info!("Auto configuration disabled; no auto modules selected");
            return Ok(ActivationResult::default());
        }

        let catalog = self.catalog()?;
        let exclusions = request.clone().exclude_names(config.excluded_modules());

        Ok(self.resolver.resolve(&catalog, &exclusions, environment)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoconfigure::{Condition, ConfigurationError, StaticEnvironment};
    use crate::config::{ENABLED_OVERRIDE_PROPERTY, EXCLUDE_PROPERTY};
    use crate::error::BootError;
    use crate::module::AutoModule;

    struct DataSourceModule;
    struct JdbcModule;
    struct WebModule;

    impl AutoModule for DataSourceModule {
        const NAME: &'static str = "app::DataSourceModule";

        fn descriptor() -> ModuleDescriptor {
            ModuleDescriptor::new(Self::NAME)
                .order(-10)
                .when(Condition::library_present("sqlx"))
        }
    }

    impl AutoModule for JdbcModule {
        const NAME: &'static str = "app::JdbcModule";

        fn descriptor() -> ModuleDescriptor {
            ModuleDescriptor::new(Self::NAME)
                .after(DataSourceModule::NAME)
                .when(Condition::component_absent("app::JdbcTemplate"))
        }
    }

    impl AutoModule for WebModule {
        const NAME: &'static str = "app::WebModule";
    }

    fn selector() -> AutoConfigurationSelector {
        let mut loader = FactoriesLoader::new();
        loader
            .parse_source(
                "core",
                "meshestra.boot.AutoModule=app::JdbcModule,app::WebModule",
            )
            .unwrap()
            .parse_source(
                "data",
                "meshestra.boot.AutoModule=app::DataSourceModule,app::JdbcModule",
            )
            .unwrap();

        let mut modules = FactoryRegistry::<ModuleDescriptor>::new();
        modules
            .register_module::<DataSourceModule>()
            .register_module::<JdbcModule>()
            .register_module::<WebModule>();

        AutoConfigurationSelector::new(loader, modules)
    }

    #[test]
    fn test_select_across_sources() {
        let env = StaticEnvironment::new().with_library("sqlx");
        let result = selector()
            .select(&ExclusionRequest::new(), &ConfigService::default(), &env)
            .unwrap();

        assert_eq!(
            result.modules(),
            ["app::DataSourceModule", "app::JdbcModule", "app::WebModule"]
        );
    }

    #[test]
    fn test_config_exclusions_merge_with_request() {
        let config = ConfigService::from_pairs([(EXCLUDE_PROPERTY, "app::WebModule,app::Unknown")]);
        let request = ExclusionRequest::new().exclude::<JdbcModule>();
        let env = StaticEnvironment::new().with_library("sqlx");

        let result = selector().select(&request, &config, &env).unwrap();

        assert_eq!(result.modules(), ["app::DataSourceModule"]);
        assert_eq!(result.report().excluded, vec!["app::JdbcModule", "app::WebModule"]);
    }

    #[test]
    fn test_disabled_selects_nothing() {
        let config = ConfigService::from_pairs([(ENABLED_OVERRIDE_PROPERTY, "false")]);
        let result = selector()
            .select(&ExclusionRequest::new(), &config, &StaticEnvironment::new())
            .unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_strong_exclusion_outside_catalog() {
        let request = ExclusionRequest::new().exclude_identity("app::Ghost");
        let err = selector()
            .select(&request, &ConfigService::default(), &StaticEnvironment::new())
            .unwrap_err();

        assert!(matches!(
            err,
            BootError::Configuration(ConfigurationError::ExcludedIdentityNotFound { .. })
        ));
    }

    #[test]
    fn test_unregistered_discovered_name() {
        let mut loader = FactoriesLoader::new();
        loader
            .parse_source("core", "meshestra.boot.AutoModule=app::Missing")
            .unwrap();
        let selector = AutoConfigurationSelector::new(loader, FactoryRegistry::new());

        let err = selector
            .select(&ExclusionRequest::new(), &ConfigService::default(), &StaticEnvironment::new())
            .unwrap_err();
        assert!(matches!(err, BootError::Discovery(DiscoveryError::UnknownFactory { .. })));
    }
}
