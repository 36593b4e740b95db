/// Declares an `Arena<'tcx>` type with one `typed_arena::Arena` per field.
///
/// Allocated references live as long as the arena itself; nothing is freed
/// before whole-arena teardown, so back-references can be plain `&'tcx`
/// without reference counting.
#[macro_export]
macro_rules! declare_arena {
    ([$($arena_name:ident : $arena_ty:ty),* $(,)?]) => {
        #[derive(Default)]
        pub struct Arena<'tcx> {
            $( pub $arena_name : typed_arena::Arena<$arena_ty>, )*
            _marker: std::marker::PhantomData<&'tcx ()>,
        }

        impl<'tcx> std::fmt::Debug for Arena<'tcx> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct("Arena").finish()
            }
        }

        pub trait ArenaAllocatable<'tcx>: Sized {
            fn allocate_on(self, arena: &'tcx Arena<'tcx>) -> &'tcx Self;
        }

        $(
            impl<'tcx> ArenaAllocatable<'tcx> for $arena_ty {
                #[inline]
                fn allocate_on(self, arena: &'tcx Arena<'tcx>) -> &'tcx Self {
                    arena.$arena_name.alloc(self)
                }
            }
        )*

        impl<'tcx> Arena<'tcx> {
            #[inline]
            pub fn alloc<T: ArenaAllocatable<'tcx>>(&'tcx self, value: T) -> &'tcx T {
                value.allocate_on(self)
            }
        }
    };
}
