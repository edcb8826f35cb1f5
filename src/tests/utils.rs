use std::path::Path;

/// Fresh per-test JSON path under the temp dir. Needs `#[named]` on the test.
#[macro_export]
macro_rules! scratch_path {
    () => {{
        let mut path = std::env::temp_dir();
        path.push("mpu-orientation-tests");
        path.push(format!("{}-{}.json", function_name!(), std::process::id()));
        $crate::tests::utils::remove_scratch(&path);
        path
    }};
}

/// Removes a scratch store and its lock file, if present.
pub(crate) fn remove_scratch(path: &Path) {
    let mut lock_path = path.as_os_str().to_owned();
    lock_path.push(".lock");
    for path in [path, Path::new(&lock_path)] {
        if path.exists() {
            std::fs::remove_file(path).unwrap();
        }
    }
}
