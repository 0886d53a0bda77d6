pub mod books;

use library_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register(books::create_module());
}
