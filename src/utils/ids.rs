/// Generates a process-unique id allocator.
///
/// Window, workspace and output handles compare by these ids; they are
/// never reused within a process.
macro_rules! id_gen {
    ($func_name:ident, $id_name:ident) => {
        static $id_name: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

        fn $func_name() -> usize {
            $id_name.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
        }
    };
}

pub(crate) use id_gen;
