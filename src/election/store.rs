// A document store on disk: one JSON array per collection.

use crate::election::*;

const VOTERS_FILE: &str = "voters.json";
const BOOTHS_FILE: &str = "booths.json";

pub struct JsonStore {
    dir: PathBuf,
    docs: MemoryStore,
}

fn read_collection<T: serde::de::DeserializeOwned>(path: &Path) -> ElectionResult<Vec<T>> {
    if !path.exists() {
        debug!("read_collection: {:?} does not exist yet", path);
        return Ok(Vec::new());
    }
    let p = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path: &p })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu { path: &p })
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

fn write_tmp<T: serde::Serialize>(path: &Path, docs: &[T]) -> ElectionResult<()> {
    let js = serde_json::to_string_pretty(docs).context(SerializingJsonSnafu {})?;
    fs::write(tmp_path(path), js).context(WritingFileSnafu {
        path: path.display().to_string(),
    })
}

fn discard_tmp(paths: &[&Path]) {
    for p in paths {
        if let Err(e) = fs::remove_file(tmp_path(p)) {
            debug!("discard_tmp: {:?}: {}", tmp_path(p), e);
        }
    }
}

impl JsonStore {
    pub fn open(dir: &str) -> ElectionResult<JsonStore> {
        let dir = PathBuf::from(dir);
        let voters: Vec<Voter> = read_collection(&dir.join(VOTERS_FILE))?;
        let booths: Vec<Booth> = read_collection(&dir.join(BOOTHS_FILE))?;
        debug!(
            "JsonStore::open: {:?}: {} voters, {} booths",
            dir,
            voters.len(),
            booths.len()
        );
        Ok(JsonStore {
            dir,
            docs: MemoryStore::new(voters, booths),
        })
    }

    pub fn save(&self) -> ElectionResult<()> {
        fs::create_dir_all(&self.dir).context(WritingFileSnafu {
            path: self.dir.display().to_string(),
        })?;
        let voters_p = self.dir.join(VOTERS_FILE);
        let booths_p = self.dir.join(BOOTHS_FILE);
        // Both collections are staged before either file is replaced.
        let staged = write_tmp(&voters_p, &self.docs.voters)
            .and_then(|_| write_tmp(&booths_p, &self.docs.booths));
        if let Err(e) = staged {
            discard_tmp(&[voters_p.as_path(), booths_p.as_path()]);
            return Err(e);
        }
        fs::rename(tmp_path(&voters_p), &voters_p).context(WritingFileSnafu {
            path: voters_p.display().to_string(),
        })?;
        fs::rename(tmp_path(&booths_p), &booths_p).context(WritingFileSnafu {
            path: booths_p.display().to_string(),
        })
    }

    pub fn voters(&self) -> &[Voter] {
        &self.docs.voters
    }

    pub fn booths(&self) -> &[Booth] {
        &self.docs.booths
    }

    pub fn booth_mut(&mut self, booth_id: &str) -> Option<&mut Booth> {
        self.docs.booths.iter_mut().find(|b| b.id == booth_id)
    }

    pub fn replace_voters(&mut self, voters: Vec<Voter>) {
        self.docs.voters = voters;
    }

    pub fn replace_booths(&mut self, booths: Vec<Booth>) {
        self.docs.booths = booths;
    }
}

impl BulkWriter for JsonStore {
    /// Applies the chunk and flushes both collections before returning.
    fn commit_chunk(&mut self, chunk_index: usize, ops: &[WriteOp]) -> Result<(), WriteError> {
        let before = self.docs.clone();
        self.docs.commit_chunk(chunk_index, ops)?;
        if let Err(e) = self.save() {
            self.docs = before;
            return Err(WriteError::new(e.to_string()));
        }
        Ok(())
    }
}
