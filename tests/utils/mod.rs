use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::datatypes::{FieldRef, SchemaRef};
use arrow::record_batch::RecordBatch;
use i94_star::schema::{RAW_DEMOGRAPHICS_SCHEMA, RAW_FACT_SCHEMA};
use i94_star::{PipelineConfig, Vocabulary};
use serde::Serialize;

/// Day offset of 2016-04-01 from 1960-01-01
pub const APRIL_FIRST_2016: &str = "20545.0";

/// Day offset of 2016-05-01 from 1960-01-01
pub const MAY_FIRST_2016: &str = "20575.0";

/// One raw I-94 arrival record, field names as in the source files
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawFact {
    pub cicid: Option<f64>,
    pub i94yr: Option<f64>,
    pub i94mon: Option<f64>,
    pub i94cit: Option<f64>,
    pub i94res: Option<f64>,
    pub i94port: Option<String>,
    pub arrdate: Option<String>,
    pub i94mode: Option<f64>,
    pub i94addr: Option<String>,
    pub depdate: Option<String>,
    pub i94bir: Option<f64>,
    pub i94visa: Option<f64>,
    pub count: Option<f64>,
    pub dtadfile: Option<String>,
    pub visapost: Option<String>,
    pub occup: Option<String>,
    pub entdepa: Option<String>,
    pub entdepd: Option<String>,
    pub entdepu: Option<String>,
    pub matflag: Option<String>,
    pub biryear: Option<f64>,
    pub dtaddto: Option<String>,
    pub gender: Option<String>,
    pub insnum: Option<String>,
    pub airline: Option<String>,
    pub admnum: Option<f64>,
    pub fltno: Option<String>,
    pub visatype: Option<String>,
}

impl RawFact {
    /// A complete arrival at `port` for a visitor staying in `state`
    #[must_use]
    pub fn arrival(id: u32, port: &str, state: &str, month: u32) -> Self {
        let arrdate = if month == 5 {
            MAY_FIRST_2016
        } else {
            APRIL_FIRST_2016
        };
        Self {
            cicid: Some(f64::from(id)),
            i94yr: Some(2016.0),
            i94mon: Some(f64::from(month)),
            i94cit: Some(101.0),
            i94res: Some(101.0),
            i94port: Some(port.to_string()),
            arrdate: Some(arrdate.to_string()),
            i94mode: Some(1.0),
            i94addr: Some(state.to_string()),
            depdate: None,
            i94bir: Some(34.0),
            i94visa: Some(2.0),
            count: Some(1.0),
            dtadfile: Some("20160401".to_string()),
            entdepa: Some("G".to_string()),
            matflag: Some("M".to_string()),
            biryear: Some(1982.0),
            gender: Some("F".to_string()),
            airline: Some("DL".to_string()),
            admnum: Some(5.5e10),
            fltno: Some("00123".to_string()),
            visatype: Some("WT".to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn without_port(mut self) -> Self {
        self.i94port = None;
        self
    }
}

/// One row of the raw demographics file
#[derive(Debug, Clone, Serialize)]
pub struct RawDemographic {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Median Age")]
    pub median_age: Option<f64>,
    #[serde(rename = "Male Population")]
    pub male_population: Option<i64>,
    #[serde(rename = "Female Population")]
    pub female_population: Option<i64>,
    #[serde(rename = "Total Population")]
    pub total_population: Option<i64>,
    #[serde(rename = "Number of Veterans")]
    pub veterans: Option<i64>,
    #[serde(rename = "Foreign-born")]
    pub foreign_born: Option<i64>,
    #[serde(rename = "Average Household Size")]
    pub household_size: Option<f64>,
    #[serde(rename = "State Code")]
    pub state_code: String,
    #[serde(rename = "Race")]
    pub race: String,
    #[serde(rename = "Count")]
    pub count: Option<i64>,
}

impl RawDemographic {
    #[must_use]
    pub fn new(city: &str, state: &str, state_code: &str, race: &str, count: i64) -> Self {
        Self {
            city: city.to_string(),
            state: state.to_string(),
            median_age: Some(33.8),
            male_population: Some(223_582),
            female_population: Some(247_997),
            total_population: Some(471_579),
            veterans: Some(14_364),
            foreign_born: Some(36_813),
            household_size: Some(2.3),
            state_code: state_code.to_string(),
            race: race.to_string(),
            count: Some(count),
        }
    }
}

fn fields(schema: &SchemaRef) -> Vec<FieldRef> {
    schema.fields().iter().cloned().collect()
}

/// Build a raw fact batch in the canonical raw schema
#[must_use]
pub fn raw_fact_batch(rows: &[RawFact]) -> RecordBatch {
    serde_arrow::to_record_batch(&fields(&RAW_FACT_SCHEMA), &rows)
        .expect("raw fact rows should serialize")
}

/// Build a raw demographics batch
#[must_use]
pub fn raw_demographics_batch(rows: &[RawDemographic]) -> RecordBatch {
    serde_arrow::to_record_batch(&fields(&RAW_DEMOGRAPHICS_SCHEMA), &rows)
        .expect("demographic rows should serialize")
}

/// Ten arrivals: two without a destination and one exact duplicate
#[must_use]
pub fn ten_arrivals() -> Vec<RawFact> {
    vec![
        RawFact::arrival(1, "ATL", "GA", 4),
        RawFact::arrival(2, "ATL", "GA", 4),
        RawFact::arrival(3, "BOS", "MA", 4),
        RawFact::arrival(4, "BOS", "MA", 4),
        RawFact::arrival(5, "NYC", "NY", 4),
        RawFact::arrival(6, "NYC", "NY", 4),
        RawFact::arrival(7, "ATL", "GA", 4),
        RawFact::arrival(8, "ATL", "GA", 4).without_port(),
        RawFact::arrival(9, "BOS", "MA", 4).without_port(),
        RawFact::arrival(1, "ATL", "GA", 4),
    ]
}

/// Reference vocabulary of destination codes
#[must_use]
pub fn vocabulary() -> Arc<Vocabulary> {
    Arc::new(Vocabulary::new(
        "i94port",
        [
            ("ATL", "ATLANTA, GA"),
            ("BOS", "BOSTON, MA"),
            ("NYC", "NEW YORK, NY"),
        ],
    ))
}

/// Vocabulary file contents matching [`vocabulary`]
pub const VOCABULARY_JSON: &str = r#"{
    "i94port": {"ATL": "ATLANTA, GA", "BOS": "BOSTON, MA", "NYC": "NEW YORK, NY"},
    "i94addr": {"GA": "GEORGIA", "MA": "MASSACHUSETTS", "99": "ALL OTHER CODES"}
}"#;

/// Semicolon-delimited demographics for Atlanta and Boston, several races each
pub const DEMOGRAPHICS_CSV: &str = "\
City;State;Median Age;Male Population;Female Population;Total Population;Number of Veterans;Foreign-born;Average Household Size;State Code;Race;Count
Atlanta;Georgia;33.8;223582;247997;471579;14364;36813;2.3;GA;Black or African-American;246632
Atlanta;Georgia;33.8;223582;247997;471579;14364;36813;2.3;GA;White;190050
Atlanta;Georgia;33.8;223582;247997;471579;14364;36813;2.3;GA;Asian;19502
Boston;Massachusetts;32.3;321618;345612;667230;14765;190104;2.4;MA;White;364041
Boston;Massachusetts;32.3;321618;345612;667230;14765;190104;2.4;MA;Asian;69587
Boston;Massachusetts;32.3;321618;345612;667230;14765;190104;2.4;MA;White;364041
";

/// Semicolon-delimited airport registry; Logan's quoted name carries escaped quotes
pub const AIRPORTS_CSV: &str = r#"Name;City;Country;IATA;ICAO;Latitude;Longitude;Altitude;Timezone;DST
Hartsfield Jackson Atlanta International Airport;Atlanta;United States;ATL;KATL;33.6367;-84.428101;1026;-5;A
"General Edward Lawrence \"Logan\" International Airport";Boston;United States;BOS;KBOS;42.36429977;-71.00520325;20;-5;A
John F Kennedy International Airport;New York;United States;JFK;KJFK;40.63980103;-73.77890015;13;-5;A
"#;

/// Write `content` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("fixture file should be writable");
    path
}

/// Render raw facts as a comma-delimited file with a header
#[must_use]
pub fn raw_facts_csv(rows: &[RawFact]) -> String {
    let header = RAW_FACT_SCHEMA
        .fields()
        .iter()
        .map(|field| field.name().as_str())
        .collect::<Vec<_>>()
        .join(",");
    let num = |v: Option<f64>| v.map(|v| format!("{v:.1}")).unwrap_or_default();
    let text = |v: &Option<String>| v.clone().unwrap_or_default();

    let mut out = header;
    out.push('\n');
    for r in rows {
        let values = [
            num(r.cicid),
            num(r.i94yr),
            num(r.i94mon),
            num(r.i94cit),
            num(r.i94res),
            text(&r.i94port),
            text(&r.arrdate),
            num(r.i94mode),
            text(&r.i94addr),
            text(&r.depdate),
            num(r.i94bir),
            num(r.i94visa),
            num(r.count),
            text(&r.dtadfile),
            text(&r.visapost),
            text(&r.occup),
            text(&r.entdepa),
            text(&r.entdepd),
            text(&r.entdepu),
            text(&r.matflag),
            num(r.biryear),
            text(&r.dtaddto),
            text(&r.gender),
            text(&r.insnum),
            text(&r.airline),
            num(r.admnum),
            text(&r.fltno),
            text(&r.visatype),
        ];
        out.push_str(&values.join(","));
        out.push('\n');
    }
    out
}

/// Lay out every input of a run under `root` and return a configuration for it
///
/// April arrivals come as Parquet, May arrivals as CSV.
pub fn write_inputs(root: &Path, april: &[RawFact], may: &[RawFact]) -> PipelineConfig {
    let sources = root.join("sources");
    std::fs::create_dir_all(&sources).expect("sources dir should be creatable");

    let april_path = sources.join("i94_apr16.parquet");
    i94_star::utils::io::parquet::write_parquet_file(
        &april_path,
        RAW_FACT_SCHEMA.clone(),
        &[raw_fact_batch(april)],
    )
    .expect("april source should be writable");
    write_file(&sources, "i94_may16.csv", &raw_facts_csv(may));

    PipelineConfig {
        fact_sources: Vec::new(),
        fact_source_dir: Some(sources),
        demographics_path: write_file(root, "us-cities-demographics.csv", DEMOGRAPHICS_CSV),
        airports_path: write_file(root, "airports.csv", AIRPORTS_CSV),
        vocabulary_path: write_file(root, "i94_labels.json", VOCABULARY_JSON),
        staging_dir: root.join("staging"),
        output_dir: root.join("output"),
        threads: 2,
        ..PipelineConfig::default()
    }
}
