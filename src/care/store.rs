//! Save files for tended trees (JSON, for easy inspection)
//!
//! Writing back a record must never rewrite its DNA history: if a save file
//! already exists, its history has to be a prefix of the one being saved.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::dna::GeneticRecord;
use super::bonsai::Bonsai;
use super::vitals::{CareConfig, Vitals};

/// Current save file format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    record: GeneticRecord,
    vitals: Vitals,
}

fn encode(bonsai: &Bonsai) -> Result<String> {
    // A record that can't be read back must never reach disk
    bonsai.record().validate()?;
    let file = SaveFile {
        version: SAVE_VERSION,
        record: bonsai.record().clone(),
        vitals: *bonsai.vitals(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

fn decode(json: &str) -> Result<SaveFile> {
    let file: SaveFile = serde_json::from_str(json)?;
    if file.version > SAVE_VERSION {
        return Err(Error::InvalidRecord(format!(
            "save version {} is newer than supported version {}",
            file.version, SAVE_VERSION
        )));
    }
    file.record.validate()?;
    Ok(file)
}

/// Refuse to overwrite a save whose history is not a prefix of ours
fn check_append_only(existing: &GeneticRecord, new: &GeneticRecord) -> Result<()> {
    let old = existing.dna_history();
    let now = new.dna_history();
    if now.len() < old.len() || now[..old.len()] != *old {
        return Err(Error::InvalidRecord(
            "saving would rewrite the DNA history of an existing tree".to_string(),
        ));
    }
    if new.stage < existing.stage {
        return Err(Error::InvalidRecord(format!(
            "saving would move the tree back from {:?} to {:?}",
            existing.stage, new.stage
        )));
    }
    Ok(())
}

/// Save a tree, creating or updating `path`
pub fn save(bonsai: &Bonsai, path: &Path) -> Result<()> {
    if path.exists() {
        let existing = decode(&std::fs::read_to_string(path)?)?;
        check_append_only(&existing.record, bonsai.record())?;
    }
    std::fs::write(path, encode(bonsai)?)?;
    log::info!("Saved {:?} ({:?}) to {}", bonsai.record().species, bonsai.record().stage, path.display());
    Ok(())
}

/// Load and validate a saved tree
pub fn load(path: &Path, config: CareConfig) -> Result<Bonsai> {
    let file = decode(&std::fs::read_to_string(path)?)?;
    log::debug!("Loaded {:?} from {}", file.record.species, path.display());
    Ok(Bonsai::from_parts(file.record, file.vitals, config))
}

/// Async variant of [`save`]
pub async fn save_async(bonsai: &Bonsai, path: &Path) -> Result<()> {
    if tokio::fs::try_exists(path).await? {
        let existing = decode(&tokio::fs::read_to_string(path).await?)?;
        check_append_only(&existing.record, bonsai.record())?;
    }
    tokio::fs::write(path, encode(bonsai)?).await?;
    log::info!("Saved {:?} ({:?}) to {}", bonsai.record().species, bonsai.record().stage, path.display());
    Ok(())
}

/// Async variant of [`load`]
pub async fn load_async(path: &Path, config: CareConfig) -> Result<Bonsai> {
    let file = decode(&tokio::fs::read_to_string(path).await?)?;
    log::debug!("Loaded {:?} from {}", file.record.species, path.display());
    Ok(Bonsai::from_parts(file.record, file.vitals, config))
}
