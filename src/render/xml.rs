//! OECD CbC XML renderer.
//!
//! Element order and nesting follow the CbC schema and must not change:
//! Table 1 reports in sheet order, Table 2 entities grouped under the
//! Table 1 jurisdiction of the same name, Table 3 only when it has content.

use crate::error::{Error, Result};
use crate::model::{CbcTables, ConstituentEntity, JurisdictionSummary};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::options::{XmlFormat, XmlOptions};

/// CbC message namespace.
pub const CBC_NAMESPACE: &str = "urn:oecd:ties:cbc:v2";
/// OECD common types namespace.
pub const STF_NAMESPACE: &str = "urn:oecd:ties:cbcstf:v5";
/// ISO code types namespace.
pub const ISO_NAMESPACE: &str = "urn:oecd:ties:isocbctypes:v1";
/// Schema version declared on the root element.
pub const SCHEMA_VERSION: &str = "2.0";

/// Render extracted tables as a CbC XML document.
///
/// The output is fully determined by `tables` and `options`.
pub fn to_xml(tables: &CbcTables, options: &XmlOptions) -> Result<String> {
    let writer = match options.format {
        XmlFormat::Pretty => Writer::new_with_indent(Vec::new(), b' ', options.indent),
        XmlFormat::Compact => Writer::new(Vec::new()),
    };

    let mut xml = CbcWriter {
        writer,
        currency: tables.currency(),
    };

    xml.writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("cbc:CBC_OECD");
    root.push_attribute(("xmlns:cbc", CBC_NAMESPACE));
    root.push_attribute(("xmlns:stf", STF_NAMESPACE));
    root.push_attribute(("xmlns:iso", ISO_NAMESPACE));
    root.push_attribute(("version", SCHEMA_VERSION));
    xml.writer.write_event(Event::Start(root))?;
    xml.start("cbc:CbcBody")?;

    xml.table1(tables)?;
    xml.table2(tables)?;
    if tables.table3.has_content() {
        xml.table3(tables)?;
    }

    xml.end("cbc:CbcBody")?;
    xml.end("cbc:CBC_OECD")?;

    String::from_utf8(xml.writer.into_inner())
        .map_err(|e| Error::Render(format!("generated XML is not UTF-8: {}", e)))
}

/// Render with default options.
pub fn to_xml_default(tables: &CbcTables) -> Result<String> {
    to_xml(tables, &XmlOptions::default())
}

struct CbcWriter<'a> {
    writer: Writer<Vec<u8>>,
    currency: &'a str,
}

impl CbcWriter<'_> {
    fn start(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::Empty(BytesStart::new(name)))?;
        Ok(())
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return self.empty(name);
        }
        self.start(name)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// A monetary amount tagged with the report currency.
    fn amount(&mut self, name: &str, value: i64) -> Result<()> {
        let mut elem = BytesStart::new(name);
        elem.push_attribute(("currCode", self.currency));
        self.writer.write_event(Event::Start(elem))?;
        self.writer
            .write_event(Event::Text(BytesText::new(&value.to_string())))?;
        self.end(name)
    }

    fn headers(&mut self, headers: &[String]) -> Result<()> {
        for header in headers {
            self.text_element("cbc:Header", header)?;
        }
        Ok(())
    }

    fn table1(&mut self, tables: &CbcTables) -> Result<()> {
        let table = &tables.table1;
        if table.headers.is_empty() && table.jurisdictions.is_empty() {
            return self.empty("cbc:Table1");
        }

        self.start("cbc:Table1")?;
        self.headers(&table.headers)?;
        for jurisdiction in &table.jurisdictions {
            self.report(jurisdiction)?;
        }
        self.end("cbc:Table1")
    }

    fn report(&mut self, j: &JurisdictionSummary) -> Result<()> {
        self.start("cbc:CbcReports")?;
        self.text_element("cbc:ResCountryCode", &j.tax_jurisdiction)?;

        self.start("cbc:Summary")?;
        self.start("cbc:Revenues")?;
        self.amount("cbc:Unrelated", j.unrelated_revenue)?;
        self.amount("cbc:Related", j.related_revenue)?;
        self.amount("cbc:Total", j.total_revenue)?;
        self.end("cbc:Revenues")?;
        self.amount("cbc:ProfitOrLoss", j.profit_loss)?;
        self.amount("cbc:TaxPaid", j.tax_paid)?;
        self.amount("cbc:TaxAccrued", j.tax_accrued)?;
        self.amount("cbc:Capital", j.capital)?;
        self.amount("cbc:Earnings", j.earnings)?;
        self.text_element("cbc:NbEmployees", &j.employees.to_string())?;
        self.amount("cbc:Assets", j.tangible_assets)?;
        self.end("cbc:Summary")?;

        self.end("cbc:CbcReports")
    }

    /// Entities are grouped by iterating Table 1's jurisdictions, so an
    /// entity whose jurisdiction is not in Table 1 is not reported.
    fn table2(&mut self, tables: &CbcTables) -> Result<()> {
        let groups: Vec<(&str, Vec<&ConstituentEntity>)> = tables
            .table1
            .jurisdictions
            .iter()
            .map(|j| {
                let name = j.tax_jurisdiction.as_str();
                (name, tables.entities_for(name).collect::<Vec<_>>())
            })
            .filter(|(_, entities)| !entities.is_empty())
            .collect();

        let orphans = tables.orphan_entities();
        if !orphans.is_empty() {
            tracing::warn!(
                dropped = orphans.len(),
                "Table 2 entities without a matching Table 1 jurisdiction are left out"
            );
        }

        if tables.table2.headers.is_empty() && groups.is_empty() {
            return self.empty("cbc:Table2");
        }

        self.start("cbc:Table2")?;
        self.headers(&tables.table2.headers)?;
        for (jurisdiction, entities) in groups {
            self.start("cbc:Jurisdiction")?;
            self.text_element("cbc:ResCountryCode", jurisdiction)?;
            for entity in entities {
                self.const_entity(entity)?;
            }
            self.end("cbc:Jurisdiction")?;
        }
        self.end("cbc:Table2")
    }

    fn const_entity(&mut self, entity: &ConstituentEntity) -> Result<()> {
        self.start("cbc:ConstEntity")?;
        self.text_element("cbc:Name", &entity.entity_name)?;
        for activity in &entity.activities {
            self.text_element("cbc:BizActivities", activity)?;
        }
        self.end("cbc:ConstEntity")
    }

    fn table3(&mut self, tables: &CbcTables) -> Result<()> {
        let table = &tables.table3;
        self.start("cbc:Table3")?;
        self.headers(&table.headers)?;
        for item in &table.additional_info {
            self.start("cbc:AdditionalInfo")?;
            self.text_element("cbc:OtherInfo", &item.other_info())?;
            self.end("cbc:AdditionalInfo")?;
        }
        self.end("cbc:Table3")
    }
}
