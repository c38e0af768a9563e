use crate::autoconfigure::ModuleDescriptor;

/// Trait for auto modules known at compile time
///
/// Implementing this gives a module a typed identity: it can be registered for
/// discovery and excluded by type rather than by a loosely-bound string.
///
/// # Example
/// ```
/// use meshestra_boot::autoconfigure::{Condition, ModuleDescriptor};
/// use meshestra_boot::module::AutoModule;
///
/// pub struct CacheModule;
///
/// impl AutoModule for CacheModule {
///     const NAME: &'static str = "app::CacheModule";
///
///     fn descriptor() -> ModuleDescriptor {
///         ModuleDescriptor::new(Self::NAME).when(Condition::library_present("moka"))
///     }
/// }
///
/// assert_eq!(CacheModule::descriptor().name(), "app::CacheModule");
/// ```
pub trait AutoModule {
    /// Identity used in discovery files and activation results
    const NAME: &'static str;

    /// Descriptor for this module; unconditional and unordered by default
    fn descriptor() -> ModuleDescriptor {
        ModuleDescriptor::new(Self::NAME)
    }
}
