//! End-to-end mapping tests: fixture record to resource graph.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use crosswalk_core::date::Precision;
use crosswalk_core::mapping::{transforms, Class, Datum, Mapper, Mapping, ValueSource};
use crosswalk_core::parser::{Parser, ParserConfig, Schema};
use crosswalk_core::record::Record;
use crosswalk_core::CrosswalkError;

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn oai_dc_mapping() -> Mapping {
    let mut mapping = Mapping::new(Class::Aggregation);
    mapping
        .uri(ValueSource::header_field(["oai:identifier"]))
        .property("provider", "Moomin Archive")
        .child("sourceResource", Class::SourceResource, |source| {
            source
                .property("title", ValueSource::field(["dc:title"]))
                .property("subject", ValueSource::field(["dc:subject"]))
                .property_with("date", ValueSource::field(["dc:date"]), transforms::edtf_date)
                .child_each(
                    "creator",
                    Class::Agent,
                    ValueSource::field(["dc:creator"]),
                    "creator",
                    |agent| {
                        agent.property("providedLabel", ValueSource::binding("creator"));
                    },
                );
        })
        .child("isShownAt", Class::WebResource, |web| {
            web.uri(ValueSource::field(["dc:identifier"]));
        });
    mapping
}

#[test]
fn test_oai_dc_to_aggregation() {
    let parser = Parser::parse(
        &Record::xml(load_fixture("oai_dc.xml")),
        &Schema::OaiDc.config(),
    )
    .unwrap();
    let aggregation = oai_dc_mapping().process_record(&parser).unwrap();

    assert_eq!(aggregation.class(), &Class::Aggregation);
    assert_eq!(aggregation.subject(), Some("oai:archive.example.org:42"));
    assert_eq!(aggregation.texts("provider"), vec!["Moomin Archive"]);

    let sources = aggregation.children("sourceResource");
    assert_eq!(sources.len(), 1);
    let source = sources[0];
    assert_eq!(source.texts("title"), vec!["Moominsummer Madness"]);
    assert_eq!(source.texts("subject"), vec!["Theatre", "Floods"]);

    let dates = source.dates("date");
    assert_eq!(dates.len(), 1);
    assert_eq!(dates[0].precision(), Some(Precision::Year));

    let creators = source.children("creator");
    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0].texts("providedLabel"), vec!["Jansson, Tove"]);

    let web = aggregation.children("isShownAt");
    assert_eq!(web[0].subject(), Some("http://archive.example.org/items/42"));
}

#[test]
fn test_binding_field_navigates_from_bound_node() {
    let parser = Parser::parse(
        &Record::xml(load_fixture("mods.xml")),
        &Schema::Mods.config(),
    )
    .unwrap();

    let mut mapping = Mapping::new(Class::SourceResource);
    mapping.child_each(
        "contributor",
        Class::Agent,
        ValueSource::field(["mods:name"]),
        "name",
        |agent| {
            agent
                .property("label", ValueSource::binding_field("name", ["mods:namePart"]))
                .property(
                    "role",
                    ValueSource::binding_field("name", ["mods:role", "mods:roleTerm"]),
                );
        },
    );
    let resource = mapping.process_record(&parser).unwrap();

    let agents = resource.children("contributor");
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0].texts("label"), vec!["Jansson, Tove"]);
    assert_eq!(agents[0].texts("role"), vec!["author"]);
    assert_eq!(agents[1].texts("label"), vec!["Portch, Elizabeth"]);
    assert_eq!(agents[1].texts("role"), vec!["translator"]);
}

#[test]
fn test_circa_date_is_approximate() {
    let parser = Parser::parse(
        &Record::xml(load_fixture("mods.xml")),
        &Schema::Mods.config(),
    )
    .unwrap();

    let mut mapping = Mapping::new(Class::SourceResource);
    mapping.property_with(
        "created",
        ValueSource::field(["mods:originInfo", "mods:dateCreated"]),
        transforms::edtf_date,
    );
    let resource = mapping.process_record(&parser).unwrap();
    let dates = resource.dates("created");
    assert_eq!(dates[0].to_string(), "1945~");
}

#[test]
fn test_header_field_requires_oai_capability() {
    let parser = Parser::parse(
        &Record::xml(load_fixture("qdc.xml")),
        &Schema::Qdc.config(),
    )
    .unwrap();

    let mut mapping = Mapping::new(Class::SourceResource);
    mapping.uri(ValueSource::header_field(["oai:identifier"]));
    let err = mapping.process_record(&parser).unwrap_err();
    assert!(matches!(err, CrosswalkError::UnsupportedOperation(_)));
}

#[test]
fn test_subject_from_record_with_two_values_fails() {
    let parser = Parser::parse(
        &Record::xml(load_fixture("oai_dc.xml")),
        &Schema::OaiDc.config(),
    )
    .unwrap();

    let mut mapping = Mapping::new(Class::SourceResource);
    mapping.uri(ValueSource::field(["dc:subject"]));
    let err = mapping.process_record(&parser).unwrap_err();
    assert!(matches!(err, CrosswalkError::InvalidSubject { count: 2 }));
}

#[test]
fn test_mapper_over_json_records() {
    let mut mapping = Mapping::new(Class::SourceResource);
    mapping
        .uri(ValueSource::computed(|scope| {
            let id = ValueSource::field(["id"]).resolve(scope)?.into_vec();
            let id = id.first().and_then(Datum::text).unwrap_or_default();
            Ok(Datum::Uri(format!("http://dp.la/api/items/{id}")).into())
        }))
        .property("title", ValueSource::field(["title"]))
        .child_each(
            "creator",
            Class::Agent,
            ValueSource::field(["creator"]),
            "agent",
            |agent| {
                agent.property("name", ValueSource::binding_field("agent", ["name"]));
            },
        );

    let mut mapper = Mapper::new();
    mapper.define("dpla_json", ParserConfig::json(""), mapping);

    let records = vec![Record::json(load_fixture("record.json"))];
    let resources: Vec<_> = mapper
        .map("dpla_json", records)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(resources.len(), 1);
    let resource = &resources[0];
    assert_eq!(resource.subject(), Some("http://dp.la/api/items/dpla-1"));
    let names: Vec<_> = resource
        .children("creator")
        .iter()
        .flat_map(|agent| agent.texts("name"))
        .collect();
    assert_eq!(names, vec!["Jansson, Tove", "Warburton, Thomas"]);

    let json = serde_json::to_value(resource).unwrap();
    assert_eq!(json["class"], "dpla:SourceResource");
}
