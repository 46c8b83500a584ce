//! Navigation catalog: the static set of in-app destinations searchable
//! without a network call.
//!
//! A catalog is built once and handed to the palette; it is never mutated
//! afterwards. Deployments can replace the built-in table with a TOML file:
//!
//! ```toml
//! [[entries]]
//! id = "dashboard"
//! title = "Dashboard"
//! path = "/dashboard"
//! keywords = ["home", "main"]
//! quick_link = true
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::candidate::{SearchCandidate, PAGES_CATEGORY};
use crate::error::{PaletteError, PaletteResult};

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    id: String,
    title: String,
    path: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    quick_link: bool,
}

/// Immutable table of navigation destinations.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<SearchCandidate>,
    quick_links: Vec<usize>,
}

impl Catalog {
    /// Build a catalog from candidates; `quick_links` lists ids shown when
    /// the query is empty. Unknown ids are ignored.
    pub fn new(entries: Vec<SearchCandidate>, quick_links: &[&str]) -> Self {
        let quick_links = quick_links
            .iter()
            .filter_map(|id| entries.iter().position(|e| e.id == *id))
            .collect();
        Self {
            entries,
            quick_links,
        }
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml(content: &str) -> PaletteResult<Self> {
        let file: CatalogFile = toml::from_str(content)?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(file.entries.len());
        let mut quick_links = Vec::new();

        for entry in file.entries {
            if !seen.insert(entry.id.clone()) {
                return Err(PaletteError::Catalog(format!(
                    "duplicate catalog id '{}'",
                    entry.id
                )));
            }
            if entry.quick_link {
                quick_links.push(entries.len());
            }
            entries.push(SearchCandidate {
                id: entry.id,
                title: entry.title,
                description: entry.description,
                category: entry.category.unwrap_or_else(|| PAGES_CATEGORY.to_string()),
                keywords: entry.keywords,
                path: entry.path,
                kind: None,
                subtitle: None,
            });
        }

        Ok(Self {
            entries,
            quick_links,
        })
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> PaletteResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PaletteError::Catalog(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn entries(&self) -> &[SearchCandidate] {
        &self.entries
    }

    /// Destinations offered before anything is typed.
    pub fn quick_links(&self) -> impl Iterator<Item = &SearchCandidate> {
        self.quick_links.iter().map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The navigation table of the PMIS client.
    pub fn builtin() -> Self {
        let entries = vec![
            SearchCandidate::page("dashboard", "Dashboard", "/dashboard")
                .with_description("Programme overview")
                .with_keywords(&["dashboard", "home", "main"]),
            SearchCandidate::page("spv-dashboard", "SPV Dashboard", "/dashboard/spv")
                .with_description("Special purpose vehicle overview")
                .with_keywords(&["spv", "owner", "portfolio"]),
            SearchCandidate::page("epc-dashboard", "EPC Dashboard", "/dashboard/epc")
                .with_description("Contractor progress and packages")
                .with_keywords(&["epc", "contractor", "execution"]),
            SearchCandidate::page("pmnc-dashboard", "PMNC Dashboard", "/dashboard/pmnc")
                .with_description("Project management consultant overview")
                .with_keywords(&["pmnc", "consultant", "pmc"]),
            SearchCandidate::page("projects", "Projects", "/projects")
                .with_description("All projects and packages")
                .with_keywords(&["project", "package", "work package"]),
            SearchCandidate::page("documents", "Document Management", "/edms/documents")
                .with_description("EDMS document register")
                .with_keywords(&["edms", "documents", "drawings", "transmittal"]),
            SearchCandidate::page("document-upload", "Upload Document", "/edms/upload")
                .with_description("Submit a new document revision")
                .with_keywords(&["edms", "upload", "revision", "submit"]),
            SearchCandidate::page("correspondence", "Correspondence", "/edms/correspondence")
                .with_description("Letters and transmittals")
                .with_keywords(&["letters", "transmittal", "inbox"]),
            SearchCandidate::page("risks", "Risk Register", "/risks")
                .with_description("Identified risks and mitigations")
                .with_keywords(&["risk", "mitigation", "issues"]),
            SearchCandidate::page("procurement", "Procurement", "/procurement")
                .with_description("Purchase requisitions and orders")
                .with_keywords(&["purchase", "requisition", "po", "vendor"]),
            SearchCandidate::page("tenders", "Tenders", "/procurement/tenders")
                .with_description("Tender packages and bid evaluation")
                .with_keywords(&["tender", "bid", "rfq", "evaluation"]),
            SearchCandidate::page("contractors", "Contractors", "/masters/contractors")
                .with_description("Contractor and vendor master")
                .with_keywords(&["contractor", "vendor", "supplier"]),
            SearchCandidate::page("locations", "Locations", "/masters/locations")
                .with_description("Sites, zones and plots")
                .with_keywords(&["site", "zone", "plot", "area"]),
            SearchCandidate::page("evm", "Earned Value", "/evm")
                .with_description("EVM curves, CPI and SPI")
                .with_keywords(&["evm", "earned value", "cpi", "spi", "s-curve"]),
            SearchCandidate::page("billing", "Billing", "/billing")
                .with_description("Running account bills and payments")
                .with_keywords(&["invoice", "bill", "payment", "ra bill"]),
            SearchCandidate::page("reports", "Reports", "/reports")
                .with_description("Progress and MIS reports")
                .with_keywords(&["report", "mis", "progress"]),
            SearchCandidate::page("settings", "Settings", "/settings")
                .with_description("Profile and preferences")
                .with_keywords(&["profile", "preferences", "account"]),
        ];

        Self::new(entries, &["dashboard", "documents", "risks", "procurement", "evm"])
    }
}
