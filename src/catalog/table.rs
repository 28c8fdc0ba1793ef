use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use super::PackageRecord;

/// Render the catalog as a six-column table, preserving record order.
/// Callers print the result; returning the table keeps it inspectable.
pub fn render(records: &[PackageRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "ID",
            "Name",
            "Description",
            "Slug",
            "Debian command",
            "Fedora command",
        ]);

    for record in records {
        table.add_row(vec![
            record.id.to_string(),
            record.package_name.clone(),
            record.package_desc.clone(),
            record.slug.clone(),
            record.command_debian.clone(),
            record.command_fedora.clone(),
        ]);
    }

    table
}
