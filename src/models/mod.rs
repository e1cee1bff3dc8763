//! Data models for the culture catalog.
//!
//! This module defines the core data structures:
//! - `Record` - one culture-catalog entry (organism + metadata)
//! - `ExtensionField` - a user-defined field attached to a record
//!
//! Records carry the full fixed-field schema of the catalog entry form in
//! camelCase wire names, plus an open `customFields` map for attributes the
//! schema does not cover. Catalog data originates from spreadsheet exports,
//! so deserialization tolerates ids carried as numbers and numeric fields
//! carried as quoted strings.

use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A user-defined extension field: a value plus the entry-form input kind
/// it was captured with (`text`, `textarea`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionField {
    pub value: String,

    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "text".to_string()
}

impl ExtensionField {
    /// Create a text extension field.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: default_kind(),
        }
    }
}

/// One culture-catalog entry.
///
/// All fixed fields are optional except `id`. Fields the record does not
/// carry are omitted from the serialized form entirely, so persisted records
/// stay as sparse as the spreadsheet rows they came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    /// Unique identifier. Source data sometimes carries this as a number;
    /// both forms deserialize to the string representation.
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    // Basic info
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bacterial_species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fungal_species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficial_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolation_media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bacteria_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fungi_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant_pathogen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_pathogen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microscopy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antagonistic_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enzyme_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrient_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characterized_organism: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    // Morphological
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gram_nature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spore_formation: Option<String>,

    // Biochemical
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxidase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nitrate_reduction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_tolerance: Option<String>,
    #[serde(rename = "pHRange", skip_serializing_if = "Option::is_none")]
    pub ph_range: Option<String>,

    // PGPR activities, each with a zone-of-inhibition measurement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phosphate_solubilization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub phosphate_solubilization_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potassium_solubilization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub potassium_solubilization_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nitrogen_fixation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub nitrogen_fixation_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zinc_solubilization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub zinc_solubilization_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iron_mobilization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub iron_mobilization_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sulphur_oxidation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub sulphur_oxidation_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silicate_solubilization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub silicate_solubilization_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iaa_production: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub iaa_production_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ga3_production: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub ga3_production_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cytokinin_production: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub cytokinin_production_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acc_deaminase_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub acc_deaminase_activity_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ammonia_production: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub ammonia_production_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ros_scavenging: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub ros_scavenging_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_drought_tolerance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub salt_drought_tolerance_zone: Option<f64>,

    // Antagonistic activities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antifungal_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub antifungal_activity_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antibacterial_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub antibacterial_activity_zone: Option<f64>,

    // Enzyme activities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chitinase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub chitinase_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucanase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub glucanase_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cellulase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub cellulase_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amylase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub amylase_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protease: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub protease_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lipase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub lipase_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phytase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub phytase_zone: Option<f64>,

    // Other activities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voc_production: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub voc_production_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biofilm_formation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub biofilm_formation_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub eps_zone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drought_tolerance: Option<String>,

    // Analytical
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whole_genome_sequencing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metabolite_extraction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_spectroscopy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hplc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcms_lcms: Option<String>,

    // Compatibility with bioagents and agrochemicals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bioagents: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fertilizer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pesticide: Option<String>,

    // Accession numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_number")]
    pub identity_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ncbi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbaim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtcc: Option<String>,

    /// Deprecated spelling of `bioagents`. Accepted on input so the legacy
    /// migration can move the value on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,

    /// User-defined extension fields keyed by field name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, ExtensionField>,
}

/// Wire names of the fixed schema, in declaration order. This drives the
/// CSV export header and `--set` key validation.
pub const FIXED_FIELDS: &[&str] = &[
    "id",
    "sourceCode",
    "location",
    "host",
    "primarySpecies",
    "bacterialSpecies",
    "fungalSpecies",
    "beneficialRole",
    "uses",
    "riskGroup",
    "isolationMedia",
    "bacteriaCount",
    "fungiCount",
    "plantPathogen",
    "animalPathogen",
    "microscopy",
    "antagonisticActivity",
    "enzymeActivity",
    "nutrientActivity",
    "dateOfCollection",
    "locationCoordinates",
    "sequenceData",
    "characterizedOrganism",
    "image",
    "shape",
    "colour",
    "gramNature",
    "sporeFormation",
    "catalase",
    "oxidase",
    "nitrateReduction",
    "saltTolerance",
    "pHRange",
    "phosphateSolubilization",
    "phosphateSolubilizationZone",
    "potassiumSolubilization",
    "potassiumSolubilizationZone",
    "nitrogenFixation",
    "nitrogenFixationZone",
    "zincSolubilization",
    "zincSolubilizationZone",
    "ironMobilization",
    "ironMobilizationZone",
    "sulphurOxidation",
    "sulphurOxidationZone",
    "silicateSolubilization",
    "silicateSolubilizationZone",
    "iaaProduction",
    "iaaProductionZone",
    "ga3Production",
    "ga3ProductionZone",
    "cytokininProduction",
    "cytokininProductionZone",
    "accDeaminaseActivity",
    "accDeaminaseActivityZone",
    "ammoniaProduction",
    "ammoniaProductionZone",
    "rosScavenging",
    "rosScavengingZone",
    "saltDroughtTolerance",
    "saltDroughtToleranceZone",
    "antifungalActivity",
    "antifungalActivityZone",
    "antibacterialActivity",
    "antibacterialActivityZone",
    "chitinase",
    "chitinaseZone",
    "glucanase",
    "glucanaseZone",
    "cellulase",
    "cellulaseZone",
    "amylase",
    "amylaseZone",
    "protease",
    "proteaseZone",
    "lipase",
    "lipaseZone",
    "phytase",
    "phytaseZone",
    "vocProduction",
    "vocProductionZone",
    "biofilmFormation",
    "biofilmFormationZone",
    "eps",
    "epsZone",
    "droughtTolerance",
    "wholeGenomeSequencing",
    "metaboliteExtraction",
    "uvSpectroscopy",
    "hplc",
    "gcmsLcms",
    "bioagents",
    "fertilizer",
    "pesticide",
    "accession",
    "identityPercent",
    "ncbi",
    "nbaim",
    "mtcc",
];

/// Enzyme activity fields, in display order.
pub const ENZYMES: &[&str] = &[
    "chitinase",
    "glucanase",
    "cellulase",
    "amylase",
    "protease",
    "lipase",
    "phytase",
];

impl Record {
    /// Fields covered by free-text search, as a haystack iterator.
    ///
    /// The set is fixed: id, primary species, location, uses, host, risk
    /// group, beneficial role, source code, gram nature, shape, colour,
    /// spore formation, catalase, oxidase. Absent fields simply contribute
    /// nothing.
    pub fn search_haystacks(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(
            [
                self.primary_species.as_deref(),
                self.location.as_deref(),
                self.uses.as_deref(),
                self.host.as_deref(),
                self.risk_group.as_deref(),
                self.beneficial_role.as_deref(),
                self.source_code.as_deref(),
                self.gram_nature.as_deref(),
                self.shape.as_deref(),
                self.colour.as_deref(),
                self.spore_formation.as_deref(),
                self.catalase.as_deref(),
                self.oxidase.as_deref(),
            ]
            .into_iter()
            .flatten(),
        )
    }

    /// Qualitative activity value for one of the named enzymes.
    pub fn enzyme(&self, name: &str) -> Option<&str> {
        match name {
            "chitinase" => self.chitinase.as_deref(),
            "glucanase" => self.glucanase.as_deref(),
            "cellulase" => self.cellulase.as_deref(),
            "amylase" => self.amylase.as_deref(),
            "protease" => self.protease.as_deref(),
            "lipase" => self.lipase.as_deref(),
            "phytase" => self.phytase.as_deref(),
            _ => None,
        }
    }

    /// Move the deprecated `compatibility` value to `bioagents`.
    ///
    /// Runs only when `bioagents` is absent; after the move the deprecated
    /// key is gone, so a second pass is a no-op. Returns true if the record
    /// changed.
    pub fn migrate_legacy(&mut self) -> bool {
        if self.bioagents.is_none() {
            if let Some(value) = self.compatibility.take() {
                self.bioagents = Some(value);
                return true;
            }
        }
        false
    }

    /// Drop extension fields whose name trims to empty. The entry form
    /// allows naming a field after creating it, so unnamed leftovers arrive
    /// here on save.
    pub fn sanitize_extensions(&mut self) {
        self.custom_fields.retain(|name, _| !name.trim().is_empty());
    }

    /// Shallow-merge a JSON patch over this record, keeping the original id.
    ///
    /// Top-level keys in the patch replace the corresponding fields
    /// wholesale (`customFields` included); keys outside the schema are
    /// ignored by deserialization.
    pub fn merge_patch(&self, patch: &serde_json::Map<String, Value>) -> crate::Result<Record> {
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => unreachable!("records serialize to objects"),
        };
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
        let mut updated: Record = serde_json::from_value(Value::Object(merged))?;
        updated.id = self.id.clone();
        updated.sanitize_extensions();
        Ok(updated)
    }
}

/// Accept an id as a JSON string or number; missing/null becomes empty so
/// the store can assign a fallback id.
fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "record id must be a string or number, got {other}"
        ))),
    }
}

/// Accept a numeric field as a JSON number or a quoted numeric string.
/// Empty or non-numeric strings read as absent rather than failing the
/// whole record.
fn de_opt_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
