use kernel_bridge::{Kernel, KernelIntrospect};

/// Combined trait object for pipeline stages that build solids and then
/// measure them on the same kernel value.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;
}

impl<T: Kernel + KernelIntrospect> KernelBundle for T {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}
