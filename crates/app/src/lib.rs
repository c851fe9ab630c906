//! # profile-store-app
//!
//! Configuration store use cases: backend routing, the local size gate,
//! index/record consistency, and explicit index repair.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod config_store;
pub mod repair_index;

pub use config_store::{
    BackendRoute, ConfigStore, ConfigStoreDeps, ConfigStoreSettings, DEFAULT_SIZE_CEILING_BYTES,
    SaveOutcome, StoreError,
};
pub use repair_index::{RepairIndexDeps, RepairReport, repair_local_index};

#[cfg(test)]
mod tests {
    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                continue;
            }
            if in_deps && line.starts_with("profile-store-") {
                let key = line.split('=').next().unwrap_or("").trim();
                deps.push(key.split('.').next().unwrap_or("").trim().to_string());
            }
        }

        deps
    }

    #[test]
    fn app_depends_only_on_ports_domain_shared() {
        let allowed = [
            "profile-store-ports",
            "profile-store-domain",
            "profile-store-shared",
        ];
        for dep in workspace_deps() {
            assert!(
                allowed.contains(&dep.as_str()),
                "unexpected dependency found: {dep}"
            );
        }
    }
}
