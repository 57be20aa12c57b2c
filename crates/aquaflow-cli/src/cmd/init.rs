use anyhow::Context;
use aquaflow_core::{
    backend::DirectoryBackend,
    config::ServiceConfig,
    io, paths,
    product::{default_catalog, Catalog},
};
use std::path::Path;

/// Default operator credentials for a fresh local store. Change them
/// before sharing the store.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing AquaFlow store in: {}", root.display());

    // 1. Create the .aquaflow directory structure
    for dir in [paths::AQUAFLOW_DIR, paths::ORDERS_DIR, paths::USERS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    // 2. Write config.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = ServiceConfig::new();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    // 3. Write the product catalog if missing
    let products_path = paths::products_path(root);
    if !products_path.exists() {
        let catalog = Catalog {
            products: default_catalog(),
        };
        catalog.save(root).context("failed to write products.yaml")?;
        println!("  created: {}", paths::PRODUCTS_FILE);
    } else {
        println!("  exists:  {}", paths::PRODUCTS_FILE);
    }

    // 4. Seed the operator account
    let backend = DirectoryBackend::open(root)?;
    if backend
        .seed_admin(ADMIN_USERNAME, ADMIN_PASSWORD)
        .context("failed to seed operator account")?
    {
        println!("  created: operator account '{ADMIN_USERNAME}' (role: admin)");
    } else {
        println!("  exists:  operator account '{ADMIN_USERNAME}'");
    }

    Ok(())
}
