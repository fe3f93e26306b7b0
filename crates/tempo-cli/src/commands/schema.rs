//! `tempo schema`: print the SQL schema.

use std::io::Write;

use anyhow::Result;

pub fn run<W: Write>(writer: &mut W) -> Result<()> {
    write!(writer, "{}", tempo_db::schema_sql())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::output;

    #[test]
    fn prints_every_table() {
        let mut out = Vec::new();
        run(&mut out).unwrap();
        let sql = output(out);
        for table in ["activity_types", "time_entries", "tags", "time_entry_tags", "goals"] {
            assert!(
                sql.contains(&format!("CREATE TABLE {table}")),
                "missing {table}"
            );
        }
    }
}
