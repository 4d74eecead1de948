use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::loader::{Package, SearchPaths};

/// Import-path keyed cache of loaded packages.
///
/// The map lock is held across the whole lookup-load-insert sequence, so
/// requests for the same path serialize here and the load runs at most
/// once per path. Entries are never evicted or replaced. Failed loads are
/// not cached; a bad path reports its error on every request.
pub struct PackageCache {
    paths: SearchPaths,
    packages: Mutex<HashMap<String, Arc<Package>>>,
}

impl PackageCache {
    pub fn new(paths: SearchPaths) -> PackageCache {
        PackageCache {
            paths,
            packages: Mutex::new(HashMap::new()),
        }
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.paths
    }

    pub fn import(&self, import_path: &str) -> Result<Arc<Package>> {
        let mut packages = match self.packages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(pkg) = packages.get(import_path) {
            return Ok(Arc::clone(pkg));
        }
        let pkg = Arc::new(self.paths.load_package(import_path)?);
        packages.insert(import_path.to_string(), Arc::clone(&pkg));
        Ok(pkg)
    }
}
