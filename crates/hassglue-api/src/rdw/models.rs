// RDW open-data response types
//
// The `m9d7-ebf2` dataset ("Gekentekende voertuigen") returns one JSON
// object per registration. Every field is a string: dates are `YYYYMMDD`,
// flags are "Ja"/"Nee", numbers are decimal text. `RawVehicle` mirrors the
// wire shape; `Vehicle` is the typed record consumers see.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Wire shape ───────────────────────────────────────────────────────

/// One registration row as returned by the open-data portal.
///
/// Only the fields we surface are modelled; the dataset carries ~80 more.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVehicle {
    pub kenteken: String,
    #[serde(default)]
    pub voertuigsoort: Option<String>,
    #[serde(default)]
    pub merk: Option<String>,
    #[serde(default)]
    pub handelsbenaming: Option<String>,
    #[serde(default)]
    pub vervaldatum_apk: Option<String>,
    #[serde(default)]
    pub datum_tenaamstelling: Option<String>,
    #[serde(default)]
    pub datum_eerste_toelating: Option<String>,
    #[serde(default)]
    pub zuinigheidslabel: Option<String>,
    #[serde(default)]
    pub aantal_zitplaatsen: Option<String>,
    #[serde(default)]
    pub aantal_deuren: Option<String>,
    #[serde(default)]
    pub massa_ledig_voertuig: Option<String>,
    #[serde(default)]
    pub catalogusprijs: Option<String>,
    #[serde(default)]
    pub wam_verzekerd: Option<String>,
    #[serde(default)]
    pub openstaande_terugroepactie_indicator: Option<String>,
    #[serde(default)]
    pub export_indicator: Option<String>,
    #[serde(default)]
    pub taxi_indicator: Option<String>,
}

// ── Typed record ─────────────────────────────────────────────────────

/// A registered vehicle, decoded from the open-data payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub vehicle_type: Option<String>,
    /// Periodic roadworthiness inspection (APK) due date.
    pub apk_expiration: Option<NaiveDate>,
    /// Date the current owner was registered.
    pub ascription_date: Option<NaiveDate>,
    pub first_admission: Option<NaiveDate>,
    pub energy_label: Option<String>,
    pub number_of_seats: Option<u32>,
    pub number_of_doors: Option<u32>,
    pub mass_empty: Option<u32>,
    pub list_price: Option<u32>,
    pub liability_insured: Option<bool>,
    pub pending_recall: Option<bool>,
    pub exported: Option<bool>,
    pub taxi: Option<bool>,
}

impl From<RawVehicle> for Vehicle {
    fn from(raw: RawVehicle) -> Self {
        Self {
            license_plate: raw.kenteken,
            brand: raw.merk.unwrap_or_default(),
            model: raw.handelsbenaming.unwrap_or_default(),
            vehicle_type: raw.voertuigsoort,
            apk_expiration: parse_date(raw.vervaldatum_apk.as_deref()),
            ascription_date: parse_date(raw.datum_tenaamstelling.as_deref()),
            first_admission: parse_date(raw.datum_eerste_toelating.as_deref()),
            energy_label: raw.zuinigheidslabel,
            number_of_seats: parse_number(raw.aantal_zitplaatsen.as_deref()),
            number_of_doors: parse_number(raw.aantal_deuren.as_deref()),
            mass_empty: parse_number(raw.massa_ledig_voertuig.as_deref()),
            list_price: parse_number(raw.catalogusprijs.as_deref()),
            liability_insured: parse_flag(raw.wam_verzekerd.as_deref()),
            pending_recall: parse_flag(raw.openstaande_terugroepactie_indicator.as_deref()),
            exported: parse_flag(raw.export_indicator.as_deref()),
            taxi: parse_flag(raw.taxi_indicator.as_deref()),
        }
    }
}

// ── Field decoders ───────────────────────────────────────────────────

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), "%Y%m%d").ok()
}

fn parse_number(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse().ok()
}

fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim() {
        "Ja" => Some(true),
        "Nee" => Some(false),
        _ => None,
    }
}
