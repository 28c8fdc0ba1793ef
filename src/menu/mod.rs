//! Interactive catalog menu.
//!
//! A single blocking loop over numeric options: list, add, update, delete,
//! install, quit. All terminal I/O goes through a generic reader/writer
//! pair so the whole flow can be driven by a scripted reader in tests.

pub mod input;

use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};

use crate::catalog::{CatalogStore, PackageDraft, PackageField, PackageRecord, table};
use crate::install::{self, CommandRunner, Distro};
use input::{CancelToken, prompt_bounded, prompt_line};

pub struct MenuFlow<R: BufRead, W: Write> {
    input: R,
    out: W,
    cancel: CancelToken,
}

/// Outcome of one sub-flow. `Stopped` means the input ran dry or the
/// session was cancelled, and the top-level loop should wind down.
enum Flow {
    Done,
    Stopped,
}

impl<R: BufRead, W: Write> MenuFlow<R, W> {
    pub fn new(input: R, out: W, cancel: CancelToken) -> Self {
        MenuFlow { input, out, cancel }
    }

    pub fn run(&mut self, store: &CatalogStore, runner: &mut dyn CommandRunner) -> Result<()> {
        loop {
            self.print_top_menu()?;
            let Some(choice) =
                prompt_line(&mut self.input, &mut self.out, "Select an option:", &self.cancel)?
            else {
                break;
            };

            let flow = match choice.as_str() {
                "1" => {
                    self.show_table(store)?;
                    Flow::Done
                }
                "2" => self.add_package(store)?,
                "3" => self.update_package(store)?,
                "4" => self.delete_package(store)?,
                "5" => self.install_packages(store, runner)?,
                "6" => break,
                _ => {
                    self.complain("Invalid option selected. Try again")?;
                    Flow::Done
                }
            };
            if let Flow::Stopped = flow {
                break;
            }
        }
        Ok(())
    }

    fn print_top_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\n{}", "Package catalog".cyan().bold())?;
        writeln!(self.out, " 1) Show all packages")?;
        writeln!(self.out, " 2) Add a package")?;
        writeln!(self.out, " 3) Update a package")?;
        writeln!(self.out, " 4) Delete a package")?;
        writeln!(self.out, " 5) Install all packages")?;
        writeln!(self.out, " 6) Quit")?;
        Ok(())
    }

    fn show_table(&mut self, store: &CatalogStore) -> Result<()> {
        let records = store.list_all()?;
        writeln!(self.out, "{}", table::render(&records))?;
        Ok(())
    }

    fn add_package(&mut self, store: &CatalogStore) -> Result<Flow> {
        let Some(draft) = self.collect_draft()? else {
            return Ok(Flow::Stopped);
        };
        let record = store.insert(&draft)?;
        writeln!(
            self.out,
            "{}",
            format!("Added {} (id {})", record.package_name, record.id).green()
        )?;
        Ok(Flow::Done)
    }

    fn update_package(&mut self, store: &CatalogStore) -> Result<Flow> {
        let Some(record) = self.resolve_record(store)? else {
            return Ok(Flow::Stopped);
        };

        loop {
            self.print_update_menu(&record)?;
            let Some(choice) =
                prompt_line(&mut self.input, &mut self.out, "Select a field:", &self.cancel)?
            else {
                return Ok(Flow::Stopped);
            };

            match choice.as_str() {
                "1" => {
                    let Some(draft) = self.collect_draft()? else {
                        return Ok(Flow::Stopped);
                    };
                    let updated = store.replace(&record, &draft)?;
                    self.report_updated(&updated)?;
                    return Ok(Flow::Done);
                }
                "2" | "3" | "4" | "5" | "6" => {
                    let field = match choice.as_str() {
                        "2" => PackageField::Name,
                        "3" => PackageField::Desc,
                        "4" => PackageField::Slug,
                        "5" => PackageField::CommandDebian,
                        _ => PackageField::CommandFedora,
                    };
                    let Some(value) = self.collect_field(field, &record.package_name)? else {
                        return Ok(Flow::Stopped);
                    };
                    let updated = store.update_field(&record, field, &value)?;
                    self.report_updated(&updated)?;
                    return Ok(Flow::Done);
                }
                "7" => return Ok(Flow::Done),
                _ => self.complain("Invalid option selected. Try again")?,
            }
        }
    }

    fn delete_package(&mut self, store: &CatalogStore) -> Result<Flow> {
        let Some(record) = self.resolve_record(store)? else {
            return Ok(Flow::Stopped);
        };
        store.delete(&record)?;
        writeln!(
            self.out,
            "{}",
            format!("Removed {} (id {})", record.package_name, record.id).green()
        )?;
        Ok(Flow::Done)
    }

    fn install_packages(
        &mut self,
        store: &CatalogStore,
        runner: &mut dyn CommandRunner,
    ) -> Result<Flow> {
        let distro = loop {
            writeln!(self.out, " 1) Debian")?;
            writeln!(self.out, " 2) Fedora")?;
            let Some(choice) = prompt_line(
                &mut self.input,
                &mut self.out,
                "Select a distribution:",
                &self.cancel,
            )?
            else {
                return Ok(Flow::Stopped);
            };
            match choice.as_str() {
                "1" => break Distro::Debian,
                "2" => break Distro::Fedora,
                _ => self.complain("Invalid option selected. Try again")?,
            }
        };

        install::install_all(store, distro, runner, &mut self.out)?;
        Ok(Flow::Done)
    }

    /// Prompt for a lookup key until it resolves to a record. The only
    /// exits are a valid key, end of input, or cancellation.
    fn resolve_record(&mut self, store: &CatalogStore) -> Result<Option<PackageRecord>> {
        loop {
            let Some(key) = prompt_line(
                &mut self.input,
                &mut self.out,
                "Package name, ID or slug:",
                &self.cancel,
            )?
            else {
                return Ok(None);
            };

            match store.find(&key) {
                Ok(record) => return Ok(Some(record)),
                Err(e) if e.is_not_found() => {
                    self.complain(&format!(
                        "'{key}' could not be found in the catalog. Try again"
                    ))?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Collect a full field set, in catalog column order.
    fn collect_draft(&mut self) -> Result<Option<PackageDraft>> {
        let Some(package_name) = self.collect_field(PackageField::Name, "")? else {
            return Ok(None);
        };
        let mut draft = PackageDraft {
            package_name,
            package_desc: String::new(),
            slug: String::new(),
            command_debian: String::new(),
            command_fedora: String::new(),
        };

        for field in [
            PackageField::Desc,
            PackageField::Slug,
            PackageField::CommandDebian,
            PackageField::CommandFedora,
        ] {
            let name = draft.package_name.clone();
            let Some(value) = self.collect_field(field, &name)? else {
                return Ok(None);
            };
            match field {
                PackageField::Desc => draft.package_desc = value,
                PackageField::Slug => draft.slug = value,
                PackageField::CommandDebian => draft.command_debian = value,
                PackageField::CommandFedora => draft.command_fedora = value,
                PackageField::Name => unreachable!(),
            }
        }
        Ok(Some(draft))
    }

    fn collect_field(&mut self, field: PackageField, package_name: &str) -> Result<Option<String>> {
        let prompt = match field {
            PackageField::Name => "Enter the name of the package:".to_string(),
            PackageField::Desc => "Enter a brief description of the package:".to_string(),
            PackageField::Slug => "Enter the slug to refer to the package:".to_string(),
            PackageField::CommandDebian => {
                format!("Enter the command for installing {package_name} on Debian:")
            }
            PackageField::CommandFedora => {
                format!("Enter the command for installing {package_name} on Fedora:")
            }
        };
        let (min, max) = field.bounds();
        prompt_bounded(
            &mut self.input,
            &mut self.out,
            &prompt,
            field.label(),
            min,
            max,
            &self.cancel,
        )
    }

    fn print_update_menu(&mut self, record: &PackageRecord) -> Result<()> {
        writeln!(
            self.out,
            "\n{}",
            format!("Updating {} (id {})", record.package_name, record.id)
                .cyan()
                .bold()
        )?;
        writeln!(self.out, " 1) Replace every field")?;
        writeln!(self.out, " 2) Change the package name")?;
        writeln!(self.out, " 3) Change the description")?;
        writeln!(self.out, " 4) Change the slug")?;
        writeln!(self.out, " 5) Change the Debian install command")?;
        writeln!(self.out, " 6) Change the Fedora install command")?;
        writeln!(self.out, " 7) Back without changes")?;
        Ok(())
    }

    fn report_updated(&mut self, record: &PackageRecord) -> Result<()> {
        writeln!(
            self.out,
            "{}",
            format!("Updated {} (id {})", record.package_name, record.id).green()
        )?;
        Ok(())
    }

    fn complain(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{}", message.red().bold())?;
        Ok(())
    }
}
