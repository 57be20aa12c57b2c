use crate::output::{print_json, print_table};
use aquaflow_core::product::Catalog;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::load(root);

    if json {
        print_json(&catalog.products)?;
        return Ok(());
    }

    let rows = catalog
        .products
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                format!("Rs.{}", p.price),
                p.description.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "PRICE", "DESCRIPTION"], rows);
    Ok(())
}
