//! KML → milestone CSV conversion.
//!
//! Survey annotations arrive as a KML file of placemarks. Each placemark
//! carries an HTML description table naming the road and the chainage
//! (`<td>台1線</td>`, `<td>12K+600</td>`) and a `Point` with a
//! `lon,lat,alt` coordinate tuple. This command streams the placemarks
//! and writes one milestone record per point:
//!
//! ```text
//! road/mileage,road,mileage,latitude,longitude
//! ```
//!
//! The zero-altitude marker is stripped and the coordinate pair is
//! reordered to latitude,longitude. Placemarks without a point are
//! skipped; a placemark whose description doesn't parse is reported and
//! counted but does not abort the conversion.

use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Line-type suffix appended to road names that omit it.
const LINE_SUFFIX: char = '線';

/// Road cell of the description table, e.g. `<td>台8甲</td>`.
fn road_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<td>(台[^<]*)</td>").expect("road regex is valid"))
}

/// Chainage cell of the description table, e.g. `<td>161K+ 800</td>`.
fn chainage_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<td>(\d+)[kK](?:\+\s*(\d+))?</td>").expect("chainage regex is valid")
    })
}

/// Raw fields collected for one placemark while streaming.
#[derive(Default)]
struct Placemark {
    description: String,
    coordinates: String,
}

/// Which text content is currently being collected.
enum Field {
    None,
    Description,
    Coordinates,
}

pub fn run(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let output_path = output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "milestones".to_string());
        input.with_file_name(format!("{stem}_milestones.csv"))
    });

    let mut reader = Reader::from_file(input)
        .with_context(|| format!("Failed to open KML file {}", input.display()))?;

    let out_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(out_file));

    let pb = ProgressBar::new_spinner();
    pb.set_message("Converting placemarks");

    let mut buf = Vec::new();
    let mut current: Option<Placemark> = None;
    let mut field = Field::None;
    let mut in_point = false;

    let mut written = 0u64;
    let mut skipped = 0u64;
    let mut failed = 0u64;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"Placemark" => current = Some(Placemark::default()),
                b"description" if current.is_some() => field = Field::Description,
                b"Point" if current.is_some() => in_point = true,
                b"coordinates" if current.is_some() && in_point => field = Field::Coordinates,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let Some(placemark) = current.as_mut() {
                    let text = t.unescape().context("Invalid XML text")?;
                    match field {
                        Field::Description => placemark.description.push_str(&text),
                        Field::Coordinates => placemark.coordinates.push_str(&text),
                        Field::None => {}
                    }
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(placemark) = current.as_mut() {
                    let text = String::from_utf8_lossy(&t);
                    match field {
                        Field::Description => placemark.description.push_str(&text),
                        Field::Coordinates => placemark.coordinates.push_str(&text),
                        Field::None => {}
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"Placemark" => {
                    if let Some(placemark) = current.take() {
                        match convert(&placemark) {
                            Ok(Some(record)) => {
                                writer.write_record(&record)?;
                                written += 1;
                            }
                            Ok(None) => skipped += 1,
                            Err(err) => {
                                failed += 1;
                                pb.println(format!("skipping placemark: {err:#}"));
                            }
                        }
                        pb.inc(1);
                    }
                }
                b"description" | b"coordinates" => field = Field::None,
                b"Point" => in_point = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("Failed to read KML"),
            Ok(_) => {}
        }
        buf.clear();
    }

    writer.flush()?;
    pb.finish_and_clear();

    println!("Converted {written} milestones ({skipped} without a point, {failed} failed)");
    println!("Output written to: {}", output_path.display());
    Ok(())
}

/// Convert one placemark into a milestone CSV record.
///
/// Returns `Ok(None)` for placemarks without a coordinate point.
fn convert(placemark: &Placemark) -> Result<Option<[String; 5]>> {
    if placemark.coordinates.trim().is_empty() {
        return Ok(None);
    }

    let (road, mileage) = parse_description(&placemark.description)?;
    let (latitude, longitude) = parse_coordinates(&placemark.coordinates)?;

    Ok(Some([
        format!("{road}/{mileage}"),
        road,
        mileage.to_string(),
        latitude,
        longitude,
    ]))
}

/// Extract road name and mileage from a placemark description table.
fn parse_description(description: &str) -> Result<(String, u32)> {
    let road_captures = road_re()
        .captures(description)
        .context("no road cell in description")?;
    let mut road = road_captures[1].trim().to_string();
    if !road.ends_with(LINE_SUFFIX) {
        road.push(LINE_SUFFIX);
    }

    let chainage_captures = chainage_re()
        .captures(description)
        .context("no chainage cell in description")?;
    let km: u32 = chainage_captures[1]
        .parse()
        .with_context(|| format!("invalid kilometers: {:?}", &chainage_captures[1]))?;
    let meters: u32 = match chainage_captures.get(2) {
        Some(m) => m
            .as_str()
            .parse()
            .with_context(|| format!("invalid meters: {:?}", m.as_str()))?,
        None => 0,
    };

    Ok((road, km * 1000 + meters))
}

/// Reorder a KML `lon,lat[,alt]` tuple to latitude,longitude, dropping
/// the altitude marker. The source digits are kept verbatim.
fn parse_coordinates(raw: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = raw.trim().split(',').map(str::trim).collect();
    if parts.len() < 2 {
        bail!("coordinate tuple {raw:?} has fewer than 2 components");
    }

    let longitude = parts[0];
    let latitude = parts[1];
    longitude
        .parse::<f64>()
        .with_context(|| format!("invalid longitude: {longitude:?}"))?;
    latitude
        .parse::<f64>()
        .with_context(|| format!("invalid latitude: {latitude:?}"))?;

    Ok((latitude.to_string(), longitude.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str = "\
<table><tr><td>公路</td><td>台8甲</td></tr>\
<tr><td>里程</td><td>12K+600</td></tr></table>";

    #[test]
    fn test_parse_description() {
        let (road, mileage) = parse_description(DESCRIPTION).unwrap();
        assert_eq!(road, "台8甲線");
        assert_eq!(mileage, 12600);
    }

    #[test]
    fn test_parse_description_space_after_plus() {
        let desc = "<td>台1線</td><td>161K+ 800</td>";
        let (road, mileage) = parse_description(desc).unwrap();
        assert_eq!(road, "台1線");
        assert_eq!(mileage, 161800);
    }

    #[test]
    fn test_parse_description_kilometers_only() {
        let desc = "<td>台9線</td><td>136K</td>";
        let (_, mileage) = parse_description(desc).unwrap();
        assert_eq!(mileage, 136000);
    }

    #[test]
    fn test_parse_description_missing_road() {
        let desc = "<td>12K+600</td>";
        assert!(parse_description(desc).is_err());
    }

    #[test]
    fn test_parse_description_missing_chainage() {
        let desc = "<td>台1線</td>";
        assert!(parse_description(desc).is_err());
    }

    #[test]
    fn test_parse_coordinates_strips_altitude_and_reorders() {
        let (lat, lon) = parse_coordinates("120.674005,24.190053,0").unwrap();
        assert_eq!(lat, "24.190053");
        assert_eq!(lon, "120.674005");
    }

    #[test]
    fn test_parse_coordinates_without_altitude() {
        let (lat, lon) = parse_coordinates("121.0,25.0").unwrap();
        assert_eq!(lat, "25.0");
        assert_eq!(lon, "121.0");
    }

    #[test]
    fn test_parse_coordinates_invalid() {
        assert!(parse_coordinates("not,numbers").is_err());
        assert!(parse_coordinates("121.0").is_err());
    }

    #[test]
    fn test_convert_skips_pointless_placemark() {
        let placemark = Placemark {
            description: DESCRIPTION.to_string(),
            coordinates: String::new(),
        };
        assert!(convert(&placemark).unwrap().is_none());
    }

    #[test]
    fn test_convert_record_layout() {
        let placemark = Placemark {
            description: DESCRIPTION.to_string(),
            coordinates: "120.674005,24.190053,0".to_string(),
        };
        let record = convert(&placemark).unwrap().unwrap();
        assert_eq!(
            record,
            [
                "台8甲線/12600".to_string(),
                "台8甲線".to_string(),
                "12600".to_string(),
                "24.190053".to_string(),
                "120.674005".to_string(),
            ]
        );
    }

    #[test]
    fn test_run_end_to_end() {
        let kml = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>台1線 12K+600</name>
      <description><![CDATA[<td>台1線</td><td>12K+600</td>]]></description>
      <Point>
        <coordinates>120.674005,24.190053,0</coordinates>
      </Point>
    </Placemark>
    <Placemark>
      <name>no point</name>
      <description><![CDATA[<td>台1線</td><td>13K</td>]]></description>
    </Placemark>
  </Document>
</kml>"#;

        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("survey.kml");
        std::fs::write(&input, kml).unwrap();

        run(&input, None).unwrap();

        let output = dir.path().join("survey_milestones.csv");
        let contents = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            contents.trim(),
            "台1線/12600,台1線,12600,24.190053,120.674005"
        );
    }
}
