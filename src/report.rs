use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;

use crate::cluster::Group;
use crate::query::Neighbor;

const NO_MATCHES: &str = "no matches found";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

/// 输出单图搜索结果，表格格式为 `距离\t标识`
pub fn write_neighbors(
    w: &mut impl Write,
    result: &[Neighbor],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(w, "{}", serde_json::to_string_pretty(result)?)?,
        OutputFormat::Table if result.is_empty() => writeln!(w, "{}", NO_MATCHES)?,
        OutputFormat::Table => {
            for n in result {
                writeln!(w, "{}\t{}", n.distance, n.id)?;
            }
        }
    }
    Ok(())
}

/// 输出全库分组结果
pub fn write_groups(w: &mut impl Write, groups: &[Group], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(w, "{}", serde_json::to_string_pretty(groups)?)?,
        OutputFormat::Table if groups.is_empty() => writeln!(w, "{}", NO_MATCHES)?,
        OutputFormat::Table => {
            for (index, group) in groups.iter().enumerate() {
                writeln!(w, "Group {}", index)?;
                for id in group {
                    writeln!(w, "  {}", id)?;
                }
            }
        }
    }
    Ok(())
}

pub fn print_neighbors(result: &[Neighbor], format: OutputFormat) -> Result<()> {
    write_neighbors(&mut std::io::stdout().lock(), result, format)
}

pub fn print_groups(groups: &[Group], format: OutputFormat) -> Result<()> {
    write_groups(&mut std::io::stdout().lock(), groups, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> String {
        let mut buf = vec![];
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_neighbors_table() {
        let result = vec![
            Neighbor { id: "a.jpg".to_string(), distance: 0 },
            Neighbor { id: "b.jpg".to_string(), distance: 3 },
        ];
        let out = render(|w| write_neighbors(w, &result, OutputFormat::Table));
        assert_eq!(out, "0\ta.jpg\n3\tb.jpg\n");
        let out = render(|w| write_neighbors(w, &[], OutputFormat::Table));
        assert_eq!(out, "no matches found\n");
    }

    #[test]
    fn test_neighbors_json() {
        let result = vec![Neighbor { id: "a.jpg".to_string(), distance: 2 }];
        let out = render(|w| write_neighbors(w, &result, OutputFormat::Json));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!([{ "id": "a.jpg", "distance": 2 }]));
    }

    #[test]
    fn test_groups() {
        let groups = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string(), "d".to_string()],
        ];
        let out = render(|w| write_groups(w, &groups, OutputFormat::Table));
        assert_eq!(out, "Group 0\n  a\n  b\nGroup 1\n  c\n  d\n");
        let out = render(|w| write_groups(w, &groups, OutputFormat::Json));
        let value: Vec<Vec<String>> = serde_json::from_str(&out).unwrap();
        assert_eq!(value, groups);
        let out = render(|w| write_groups(w, &[], OutputFormat::Json));
        assert_eq!(out.trim(), "[]");
    }
}
