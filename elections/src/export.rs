// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! Write datasets and comparisons to files.

use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::Context;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::info;
use crate::assemble::ElectionDataset;

/// One line per municipality, headed `municipality,link,<columns>`. Null values are empty cells. Geometry is not included.
pub fn write_csv<W:Write>(dataset:&ElectionDataset,out:W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec!["municipality","link"];
    header.extend(dataset.columns.iter().map(|c|c.as_str()));
    writer.write_record(&header)?;
    for row in &dataset.rows {
        let mut record = vec![row.municipality.clone(),row.link.clone().unwrap_or_default()];
        record.extend(row.values.iter().map(|v|v.map(|v|v.to_string()).unwrap_or_default()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// A GeoJSON FeatureCollection with one feature per municipality. Properties are the name, link and non-null values.
pub fn to_geojson(dataset:&ElectionDataset) -> Value {
    let features : Vec<Value> = dataset.rows.iter().map(|row|{
        let mut properties = Map::new();
        properties.insert("municipality".to_string(),Value::String(row.municipality.clone()));
        if let Some(link) = &row.link { properties.insert("link".to_string(),Value::String(link.clone())); }
        for (column,value) in dataset.columns.iter().zip(row.values.iter()) {
            if let Some(value) = value { properties.insert(column.clone(),json!(value)); }
        }
        json!({
            "type": "Feature",
            "properties": properties,
            "geometry": row.geometry.clone().unwrap_or(Value::Null),
        })
    }).collect();
    json!({ "type": "FeatureCollection", "features": features })
}

pub fn write_geojson<W:Write>(dataset:&ElectionDataset,out:W) -> anyhow::Result<()> {
    serde_json::to_writer(out,&to_geojson(dataset))?;
    Ok(())
}

/// Pretty printed JSON of anything serializable, such as a comparison report.
pub fn write_json_file<T:Serialize>(value:&T,path:&Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() { std::fs::create_dir_all(parent)?; }
    let file = std::fs::File::create(path).with_context(||format!("Could not create {}",path.to_string_lossy()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file),value)?;
    info!(path=%path.to_string_lossy(),"wrote json");
    Ok(())
}

/// Write `{year}.csv` and `{year}.geojson` into the directory, returning their paths.
pub fn save_dataset(dataset:&ElectionDataset,dir:&Path) -> anyhow::Result<(PathBuf,PathBuf)> {
    std::fs::create_dir_all(dir).with_context(||format!("Could not create directory {}",dir.to_string_lossy()))?;
    let csv_path = dir.join(format!("{}.csv",dataset.year));
    write_csv(dataset,std::fs::File::create(&csv_path).with_context(||format!("Could not create {}",csv_path.to_string_lossy()))?)?;
    let geojson_path = dir.join(format!("{}.geojson",dataset.year));
    write_geojson(dataset,std::io::BufWriter::new(std::fs::File::create(&geojson_path).with_context(||format!("Could not create {}",geojson_path.to_string_lossy()))?))?;
    info!(year=%dataset.year,csv=%csv_path.to_string_lossy(),geojson=%geojson_path.to_string_lossy(),"saved dataset");
    Ok((csv_path,geojson_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::MunicipalityRow;
    use crate::municipality::FieldValue;

    fn dataset() -> ElectionDataset {
        ElectionDataset{
            year: "2021".to_string(),
            columns: vec!["pp".to_string(),"pp_percentage".to_string()],
            rows: vec![
                MunicipalityRow{ municipality: "Alcalá de Henares".to_string(), link: Some("https://example.com/a.html".to_string()), values: vec![Some(FieldValue::Count(1234)),Some(FieldValue::Percentage(12.5))], geometry: Some(json!({"type":"Point","coordinates":[1,2]})) },
                MunicipalityRow{ municipality: "Madrid".to_string(), link: None, values: vec![None,Some(FieldValue::Percentage(40.0))], geometry: None },
            ],
        }
    }

    #[test]
    fn test_csv() {
        let mut out = vec![];
        write_csv(&dataset(),&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text,"municipality,link,pp,pp_percentage\nAlcalá de Henares,https://example.com/a.html,1234,12.5\nMadrid,,,40.0\n");
    }

    #[test]
    fn test_geojson() {
        let g = to_geojson(&dataset());
        assert_eq!(g["type"],"FeatureCollection");
        let features = g["features"].as_array().unwrap();
        assert_eq!(features.len(),2);
        assert_eq!(features[0]["properties"]["pp"],json!(1234));
        assert_eq!(features[0]["properties"]["pp_percentage"],json!(12.5));
        assert_eq!(features[0]["geometry"]["type"],"Point");
        assert!(features[1]["properties"].get("pp").is_none());
        assert!(features[1]["properties"].get("link").is_none());
        assert_eq!(features[1]["geometry"],Value::Null);
    }

    #[test]
    fn test_save_dataset() {
        let dir = std::env::temp_dir().join(format!("municipal_votes_export_test_{}",std::process::id()));
        let (csv_path,geojson_path) = save_dataset(&dataset(),&dir).unwrap();
        assert_eq!(csv_path,dir.join("2021.csv"));
        let geojson : Value = serde_json::from_str(&std::fs::read_to_string(&geojson_path).unwrap()).unwrap();
        assert_eq!(geojson["features"][1]["properties"]["municipality"],"Madrid");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
