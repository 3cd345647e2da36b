//! Column names, raw input schemas and output schemas of the star schema.

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

/// Raw immigration (fact source) column names
pub mod raw {
    pub const CICID: &str = "cicid";
    pub const I94YR: &str = "i94yr";
    pub const I94MON: &str = "i94mon";
    pub const I94CIT: &str = "i94cit";
    pub const I94RES: &str = "i94res";
    pub const I94PORT: &str = "i94port";
    pub const ARRDATE: &str = "arrdate";
    pub const I94MODE: &str = "i94mode";
    pub const I94ADDR: &str = "i94addr";
    pub const DEPDATE: &str = "depdate";
    pub const I94BIR: &str = "i94bir";
    pub const I94VISA: &str = "i94visa";
    pub const COUNT: &str = "count";
    pub const DTADFILE: &str = "dtadfile";
    pub const VISAPOST: &str = "visapost";
    pub const OCCUP: &str = "occup";
    pub const ENTDEPA: &str = "entdepa";
    pub const ENTDEPD: &str = "entdepd";
    pub const ENTDEPU: &str = "entdepu";
    pub const MATFLAG: &str = "matflag";
    pub const BIRYEAR: &str = "biryear";
    pub const DTADDTO: &str = "dtaddto";
    pub const GENDER: &str = "gender";
    pub const INSNUM: &str = "insnum";
    pub const AIRLINE: &str = "airline";
    pub const ADMNUM: &str = "admnum";
    pub const FLTNO: &str = "fltno";
    pub const VISATYPE: &str = "visatype";
}

/// Immigration fact table column names
pub mod fact {
    pub const ID: &str = "id";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const ORIGIN_CODE: &str = "origin_code";
    pub const RESIDENCE_CODE: &str = "residence_code";
    pub const DESTINATION_CODE: &str = "destination_code";
    pub const ARRIVAL_DATE: &str = "arrival_date";
    pub const TRAVEL_MODE_CODE: &str = "travel_mode_code";
    pub const STATE_CODE: &str = "state_code";
    pub const DEPARTURE_DATE: &str = "departure_date";
    pub const AGE: &str = "age";
    pub const VISA_CATEGORY_CODE: &str = "visa_category_code";
    pub const PERSON_COUNT: &str = "person_count";
    pub const MATCH_FLAG: &str = "match_flag";
    pub const BIRTH_YEAR: &str = "birth_year";
    pub const GENDER: &str = "gender";
    pub const AIRLINE: &str = "airline";
    pub const FLIGHT_NUMBER: &str = "flight_number";
    pub const VISA_TYPE: &str = "visa_type";
}

/// Raw demographics file header names
pub mod raw_demographics {
    pub const CITY: &str = "City";
    pub const STATE: &str = "State";
    pub const MEDIAN_AGE: &str = "Median Age";
    pub const MALE_POPULATION: &str = "Male Population";
    pub const FEMALE_POPULATION: &str = "Female Population";
    pub const TOTAL_POPULATION: &str = "Total Population";
    pub const VETERANS: &str = "Number of Veterans";
    pub const FOREIGN_BORN: &str = "Foreign-born";
    pub const AVG_HOUSEHOLD_SIZE: &str = "Average Household Size";
    pub const STATE_CODE: &str = "State Code";
    pub const RACE: &str = "Race";
    pub const COUNT: &str = "Count";
}

/// City demographics and state dimension column names
pub mod demographics {
    pub const CITY: &str = "city";
    pub const STATE_NAME: &str = "state_name";
    pub const MEDIAN_AGE: &str = "median_age";
    pub const MALE_POPULATION: &str = "male_population";
    pub const FEMALE_POPULATION: &str = "female_population";
    pub const TOTAL_POPULATION: &str = "total_population";
    pub const FOREIGN_BORN: &str = "foreign_born";
    pub const STATE_CODE: &str = "state_code";
    pub const RACE: &str = "race";

    pub const CODE: &str = "code";
    pub const NAME: &str = "name";
}

/// Raw airport registry header names
pub mod raw_airports {
    pub const NAME: &str = "Name";
    pub const CITY: &str = "City";
    pub const COUNTRY: &str = "Country";
    pub const IATA: &str = "IATA";
    pub const ICAO: &str = "ICAO";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const ALTITUDE: &str = "Altitude";
    pub const TIMEZONE: &str = "Timezone";
    pub const DST: &str = "DST";
}

/// Airport dimension column names
pub mod airports {
    pub const IATA: &str = "iata";
    pub const NAME: &str = "name";
    pub const CITY: &str = "city";
    pub const COUNTRY: &str = "country";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const ALTITUDE: &str = "altitude";
    pub const TIMEZONE: &str = "timezone";
    pub const DST: &str = "dst";
}

/// Output table names
pub mod tables {
    pub const IMMIGRATION: &str = "immigration";
    pub const CITY_DEMOGRAPHICS: &str = "city_demographics";
    pub const STATES: &str = "states";
    pub const AIRPORTS: &str = "airports";
    pub const IMMIGRATION_RAW: &str = "immigration_raw";
}

/// Columns that must be non-null for a fact row to be kept
pub const REQUIRED_FACT_COLUMNS: [&str; 4] =
    [raw::I94PORT, raw::CICID, raw::ARRDATE, raw::I94ADDR];

/// Administrative and privacy-sensitive fact columns dropped before renaming
pub const DROPPED_FACT_COLUMNS: [&str; 9] = [
    raw::ENTDEPA,
    raw::ENTDEPD,
    raw::ENTDEPU,
    raw::OCCUP,
    raw::INSNUM,
    raw::ADMNUM,
    raw::DTADFILE,
    raw::VISAPOST,
    raw::DTADDTO,
];

/// Demographic columns dropped before the city table is derived
pub const DROPPED_DEMOGRAPHIC_COLUMNS: [&str; 3] = [
    raw_demographics::COUNT,
    raw_demographics::VETERANS,
    raw_demographics::AVG_HOUSEHOLD_SIZE,
];

/// Raw to output names for demographic columns that survive the drop
pub const DEMOGRAPHIC_RENAMES: [(&str, &str); 9] = [
    (raw_demographics::CITY, demographics::CITY),
    (raw_demographics::STATE, demographics::STATE_NAME),
    (raw_demographics::MEDIAN_AGE, demographics::MEDIAN_AGE),
    (raw_demographics::MALE_POPULATION, demographics::MALE_POPULATION),
    (raw_demographics::FEMALE_POPULATION, demographics::FEMALE_POPULATION),
    (raw_demographics::TOTAL_POPULATION, demographics::TOTAL_POPULATION),
    (raw_demographics::FOREIGN_BORN, demographics::FOREIGN_BORN),
    (raw_demographics::STATE_CODE, demographics::STATE_CODE),
    (raw_demographics::RACE, demographics::RACE),
];

/// Raw to output names for the airport dimension; `ICAO` is not carried over
pub const AIRPORT_RENAMES: [(&str, &str); 9] = [
    (raw_airports::IATA, airports::IATA),
    (raw_airports::NAME, airports::NAME),
    (raw_airports::CITY, airports::CITY),
    (raw_airports::COUNTRY, airports::COUNTRY),
    (raw_airports::LATITUDE, airports::LATITUDE),
    (raw_airports::LONGITUDE, airports::LONGITUDE),
    (raw_airports::ALTITUDE, airports::ALTITUDE),
    (raw_airports::TIMEZONE, airports::TIMEZONE),
    (raw_airports::DST, airports::DST),
];

/// How a kept raw fact column becomes an output column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Cast to the output type (unparseable values become null)
    Cast,
    /// Day offset from 1960-01-01 to a calendar date
    DayOffsetDate,
    /// `"M"` to true, anything else to false
    MatchFlag,
    /// Trimmed, numeric-tolerant code string
    Code,
}

/// One output column of the fact table
#[derive(Debug, Clone)]
pub struct FactColumn {
    /// Raw source column
    pub raw: &'static str,
    /// Output column name
    pub name: &'static str,
    /// Output type
    pub data_type: DataType,
    /// How the value is derived
    pub derivation: Derivation,
}

const fn column(
    raw: &'static str,
    name: &'static str,
    data_type: DataType,
    derivation: Derivation,
) -> FactColumn {
    FactColumn {
        raw,
        name,
        data_type,
        derivation,
    }
}

/// Fact table columns, in output order
pub const FACT_COLUMNS: [FactColumn; 19] = [
    column(raw::CICID, fact::ID, DataType::Int64, Derivation::Cast),
    column(raw::I94YR, fact::YEAR, DataType::Int32, Derivation::Cast),
    column(raw::I94MON, fact::MONTH, DataType::Int32, Derivation::Cast),
    column(raw::I94CIT, fact::ORIGIN_CODE, DataType::Int32, Derivation::Cast),
    column(raw::I94RES, fact::RESIDENCE_CODE, DataType::Int32, Derivation::Cast),
    column(raw::I94PORT, fact::DESTINATION_CODE, DataType::Utf8, Derivation::Code),
    column(raw::ARRDATE, fact::ARRIVAL_DATE, DataType::Date32, Derivation::DayOffsetDate),
    column(raw::I94MODE, fact::TRAVEL_MODE_CODE, DataType::Int32, Derivation::Cast),
    column(raw::I94ADDR, fact::STATE_CODE, DataType::Utf8, Derivation::Code),
    column(raw::DEPDATE, fact::DEPARTURE_DATE, DataType::Date32, Derivation::DayOffsetDate),
    column(raw::I94BIR, fact::AGE, DataType::Int32, Derivation::Cast),
    column(raw::I94VISA, fact::VISA_CATEGORY_CODE, DataType::Int32, Derivation::Cast),
    column(raw::COUNT, fact::PERSON_COUNT, DataType::Int32, Derivation::Cast),
    column(raw::MATFLAG, fact::MATCH_FLAG, DataType::Boolean, Derivation::MatchFlag),
    column(raw::BIRYEAR, fact::BIRTH_YEAR, DataType::Int32, Derivation::Cast),
    column(raw::GENDER, fact::GENDER, DataType::Utf8, Derivation::Cast),
    column(raw::AIRLINE, fact::AIRLINE, DataType::Utf8, Derivation::Cast),
    column(raw::FLTNO, fact::FLIGHT_NUMBER, DataType::Utf8, Derivation::Cast),
    column(raw::VISATYPE, fact::VISA_TYPE, DataType::Utf8, Derivation::Cast),
];

/// Canonical raw fact schema (28 columns)
///
/// Day offsets are kept as text so a malformed value reaches the date
/// derivation instead of being nulled while the source is read.
pub static RAW_FACT_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    let float = |name: &str| Field::new(name, DataType::Float64, true);
    let text = |name: &str| Field::new(name, DataType::Utf8, true);
    Arc::new(Schema::new(vec![
        float(raw::CICID),
        float(raw::I94YR),
        float(raw::I94MON),
        float(raw::I94CIT),
        float(raw::I94RES),
        text(raw::I94PORT),
        text(raw::ARRDATE),
        float(raw::I94MODE),
        text(raw::I94ADDR),
        text(raw::DEPDATE),
        float(raw::I94BIR),
        float(raw::I94VISA),
        float(raw::COUNT),
        text(raw::DTADFILE),
        text(raw::VISAPOST),
        text(raw::OCCUP),
        text(raw::ENTDEPA),
        text(raw::ENTDEPD),
        text(raw::ENTDEPU),
        text(raw::MATFLAG),
        float(raw::BIRYEAR),
        text(raw::DTADDTO),
        text(raw::GENDER),
        text(raw::INSNUM),
        text(raw::AIRLINE),
        float(raw::ADMNUM),
        text(raw::FLTNO),
        text(raw::VISATYPE),
    ]))
});

/// Output schema of the immigration fact table
pub static FACT_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(
        FACT_COLUMNS
            .iter()
            .map(|c| Field::new(c.name, c.data_type.clone(), c.derivation != Derivation::MatchFlag))
            .collect::<Vec<_>>(),
    ))
});

/// Schema of the raw demographics file (12 columns)
pub static RAW_DEMOGRAPHICS_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    use raw_demographics as d;
    Arc::new(Schema::new(vec![
        Field::new(d::CITY, DataType::Utf8, true),
        Field::new(d::STATE, DataType::Utf8, true),
        Field::new(d::MEDIAN_AGE, DataType::Float64, true),
        Field::new(d::MALE_POPULATION, DataType::Int64, true),
        Field::new(d::FEMALE_POPULATION, DataType::Int64, true),
        Field::new(d::TOTAL_POPULATION, DataType::Int64, true),
        Field::new(d::VETERANS, DataType::Int64, true),
        Field::new(d::FOREIGN_BORN, DataType::Int64, true),
        Field::new(d::AVG_HOUSEHOLD_SIZE, DataType::Float64, true),
        Field::new(d::STATE_CODE, DataType::Utf8, true),
        Field::new(d::RACE, DataType::Utf8, true),
        Field::new(d::COUNT, DataType::Int64, true),
    ]))
});

/// Schema of the raw airport registry (10 columns)
pub static RAW_AIRPORTS_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    use raw_airports as a;
    Arc::new(Schema::new(vec![
        Field::new(a::NAME, DataType::Utf8, true),
        Field::new(a::CITY, DataType::Utf8, true),
        Field::new(a::COUNTRY, DataType::Utf8, true),
        Field::new(a::IATA, DataType::Utf8, true),
        Field::new(a::ICAO, DataType::Utf8, true),
        Field::new(a::LATITUDE, DataType::Float64, true),
        Field::new(a::LONGITUDE, DataType::Float64, true),
        Field::new(a::ALTITUDE, DataType::Int64, true),
        Field::new(a::TIMEZONE, DataType::Float64, true),
        Field::new(a::DST, DataType::Utf8, true),
    ]))
});

fn renamed_schema(source: &Schema, renames: &[(&str, &str)]) -> Schema {
    Schema::new(
        renames
            .iter()
            .filter_map(|(from, to)| {
                source
                    .field_with_name(from)
                    .ok()
                    .map(|field| field.clone().with_name(*to))
            })
            .collect::<Vec<_>>(),
    )
}

/// Output schema of the city demographics dimension
pub static CITY_DEMOGRAPHICS_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    let renamed = renamed_schema(&RAW_DEMOGRAPHICS_SCHEMA, &DEMOGRAPHIC_RENAMES);
    let fields: Vec<Field> = renamed
        .fields()
        .iter()
        .filter(|f| f.name() != demographics::STATE_NAME)
        .map(|f| f.as_ref().clone())
        .collect();
    Arc::new(Schema::new(fields))
});

/// Output schema of the state dimension
pub static STATES_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new(demographics::CODE, DataType::Utf8, true),
        Field::new(demographics::NAME, DataType::Utf8, true),
    ]))
});

/// Output schema of the airport dimension
pub static AIRPORTS_SCHEMA: LazyLock<SchemaRef> =
    LazyLock::new(|| Arc::new(renamed_schema(&RAW_AIRPORTS_SCHEMA, &AIRPORT_RENAMES)));
