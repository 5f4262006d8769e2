// SPDX-License-Identifier: Apache-2.0

use crate::config::ArtifactsConfig;
use crate::felt::Felt;
use itertools::Itertools;
use normalize_path::NormalizePath;
use serde::Deserializer;
use serde_derive::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found '{}'", .0.display())]
    NotFound(PathBuf),
    #[error(
        "found multiple artifacts matching '{}': {}",
        .name.display(),
        .candidates.iter().map(|p| format!("'{}'", p.display())).join(", ")
    )]
    Ambiguous {
        name: PathBuf,
        candidates: Vec<PathBuf>,
    },
    #[error("cannot read artifact '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("artifact '{}' is not a valid contract class: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A compiled StarkNet contract class, as written by the Cairo compiler.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContractClass {
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
    #[serde(default)]
    pub entry_points_by_type: BTreeMap<EntryPointType, Vec<EntryPoint>>,
    /// The compiled program. Only the simulator looks inside.
    #[serde(default)]
    pub program: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbiEntry {
    Function(AbiFunction),
    Constructor(AbiFunction),
    L1Handler(AbiFunction),
    Struct(AbiStruct),
    Event(AbiEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AbiParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AbiFunction {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(
        default,
        rename = "stateMutability",
        skip_serializing_if = "Option::is_none"
    )]
    pub state_mutability: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AbiStruct {
    pub name: String,
    pub size: usize,
    #[serde(default)]
    pub members: Vec<AbiMember>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AbiMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AbiEvent {
    pub name: String,
    #[serde(default)]
    pub keys: Vec<AbiParam>,
    #[serde(default)]
    pub data: Vec<AbiParam>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum EntryPointType {
    #[serde(rename = "CONSTRUCTOR")]
    Constructor,
    #[serde(rename = "EXTERNAL")]
    External,
    #[serde(rename = "L1_HANDLER")]
    L1Handler,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EntryPoint {
    #[serde(deserialize_with = "deserialize_selector", serialize_with = "serialize_selector")]
    pub selector: Felt,
    /// Either a hex string or a plain number, depending on compiler version.
    pub offset: serde_json::Value,
}

impl ContractClass {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&contents).map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// All external and view functions, in abi order.
    pub fn functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.abi.iter().filter_map(|entry| match entry {
            AbiEntry::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions().find(|f| f.name == name)
    }

    pub fn constructor(&self) -> Option<&AbiFunction> {
        self.abi.iter().find_map(|entry| match entry {
            AbiEntry::Constructor(f) => Some(f),
            _ => None,
        })
    }

    pub fn abi_struct(&self, name: &str) -> Option<&AbiStruct> {
        self.abi.iter().find_map(|entry| match entry {
            AbiEntry::Struct(s) if s.name == name => Some(s),
            _ => None,
        })
    }

    pub fn entry_points(&self, ty: EntryPointType) -> &[EntryPoint] {
        self.entry_points_by_type
            .get(&ty)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of field elements needed to encode a value of the given abi
    /// type, or `None` for pointers and unknown types.
    pub fn type_size(&self, ty: &str) -> Option<usize> {
        if ty == "felt" {
            Some(1)
        } else if ty.ends_with('*') {
            None
        } else if let Some(s) = self.abi_struct(ty) {
            Some(s.size)
        } else if ty.starts_with('(') && ty.ends_with(')') {
            // named or anonymous tuple, e.g. (felt, Uint256) or (a : felt, b : felt)
            tuple_members(&ty[1..ty.len() - 1])
                .into_iter()
                .filter(|member| !member.is_empty())
                .map(|member| {
                    // a member is either `name : type` or just a type
                    let member_ty = match member.split_once(':') {
                        Some((name, member_ty)) if !name.contains('(') => member_ty,
                        _ => member,
                    };
                    self.type_size(member_ty.trim())
                })
                .sum()
        } else {
            None
        }
    }
}

/// Split tuple members on the commas which are not inside a nested tuple.
fn tuple_members(members: &str) -> Vec<&str> {
    let mut depth = 0usize;
    let mut start = 0;
    let mut result = Vec::new();

    for (i, c) in members.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                result.push(members[start..i].trim());
                start = i + 1;
            }
            _ => (),
        }
    }

    result.push(members[start..].trim());

    result
}

impl AbiFunction {
    /// Number of field elements this function takes as calldata, if it is
    /// fixed.
    pub fn calldata_len(&self, class: &ContractClass) -> Option<usize> {
        self.inputs.iter().map(|p| class.type_size(&p.ty)).sum()
    }

    pub fn is_view(&self) -> bool {
        self.state_mutability.as_deref() == Some("view")
    }
}

fn deserialize_selector<'de, D>(deserializer: D) -> Result<Felt, D::Error>
where
    D: Deserializer<'de>,
{
    let selector = <String as serde::Deserialize>::deserialize(deserializer)?;

    selector.parse().map_err(serde::de::Error::custom)
}

fn serialize_selector<S>(selector: &Felt, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&selector.to_hex_string())
}

/// Finds contract class artifacts on disk and caches the parsed classes.
#[derive(Default)]
pub struct ContractClassResolver {
    /// Directories searched for artifacts
    import_paths: Vec<PathBuf>,
    /// List of class by path
    cached_paths: HashMap<PathBuf, usize>,
    /// The parsed classes
    classes: Vec<ResolvedClass>,
}

/// An artifact that was found, and where.
#[derive(Clone, Debug)]
pub struct ResolvedClass {
    /// Name used in the configuration or on the command line
    pub name: OsString,
    /// Full path on the filesystem
    pub full_path: PathBuf,
    /// Which import path was used, if any
    pub import_no: Option<usize>,
    pub class: Arc<ContractClass>,
}

impl ContractClassResolver {
    /// Add import path. Adding the same path twice has no effect.
    pub fn add_import_path(&mut self, path: &Path) {
        if !self.import_paths.iter().any(|p| p == path) {
            self.import_paths.push(path.to_path_buf());
        }
    }

    pub fn get_import_paths(&self) -> &[PathBuf] {
        self.import_paths.as_slice()
    }

    /// Register an already parsed class under a name, as if it had been loaded
    /// from that path.
    pub fn set_class(&mut self, path: &str, class: ContractClass) {
        let pos = self.classes.len();
        let pathbuf = PathBuf::from(path);

        self.classes.push(ResolvedClass {
            name: path.into(),
            full_path: pathbuf.clone(),
            import_no: None,
            class: Arc::new(class),
        });

        self.cached_paths.insert(pathbuf.normalize(), pos);
    }

    /// Number of classes parsed so far.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Attempt to load an artifact, either from the cache or from the filesystem.
    /// Returns Ok(Some(..)) if the file is found and parsed
    /// Returns Ok(None) if no file by this path can be found.
    /// Returns Err(..) if a file was found but could not be read or parsed.
    fn try_file(
        &mut self,
        name: &OsStr,
        path: &Path,
        import_no: Option<usize>,
    ) -> Result<Option<ResolvedClass>, ArtifactError> {
        // For accessing the cache, remove "." and ".." path components
        let cache_path = path.normalize();

        if let Some(cache) = self.cached_paths.get(&cache_path) {
            let mut class = self.classes[*cache].clone();
            class.import_no = import_no;
            return Ok(Some(class));
        }

        if let Ok(full_path) = path.canonicalize() {
            if full_path.is_file() {
                let class = self.load_file(name, &cache_path, &full_path, import_no)?;
                return Ok(Some(class.clone()));
            }
        }

        Ok(None)
    }

    /// Populate the cache with the parsed artifact
    fn load_file(
        &mut self,
        name: &OsStr,
        cache_path: &Path,
        full_path: &Path,
        import_no: Option<usize>,
    ) -> Result<&ResolvedClass, ArtifactError> {
        if let Some(cache) = self.cached_paths.get(full_path) {
            let pos = *cache;
            self.cached_paths.insert(cache_path.to_path_buf(), pos);
            return Ok(&self.classes[pos]);
        }

        let class = ContractClass::from_file(full_path)?;

        debug!(
            path = %full_path.display(),
            functions = class.functions().count(),
            "loaded contract class"
        );

        let pos = self.classes.len();

        self.classes.push(ResolvedClass {
            name: name.into(),
            full_path: full_path.to_path_buf(),
            import_no,
            class: Arc::new(class),
        });

        self.cached_paths.insert(cache_path.to_path_buf(), pos);
        self.cached_paths.insert(full_path.to_path_buf(), pos);

        Ok(&self.classes[pos])
    }

    /// Find an artifact. The name is tried as given first; relative names
    /// are then looked up in every import path. A name which resolves in more
    /// than one import path is an error.
    pub fn resolve(&mut self, name: &OsStr) -> Result<ResolvedClass, ArtifactError> {
        let path_name = PathBuf::from(name);

        if let Some(class) = self.try_file(name, &path_name, None)? {
            return Ok(class);
        } else if path_name.is_absolute() {
            return Err(ArtifactError::NotFound(path_name));
        }

        let mut result: Vec<ResolvedClass> = vec![];

        for import_no in 0..self.import_paths.len() {
            let path = self.import_paths[import_no].join(&path_name);

            if let Some(class) = self.try_file(name, &path, Some(import_no))? {
                // the same file reachable through two import paths is fine
                if !result.iter().any(|c| c.full_path == class.full_path) {
                    result.push(class);
                }
            }
        }

        match result.len() {
            0 => Err(ArtifactError::NotFound(path_name)),
            1 => Ok(result.remove(0)),
            _ => Err(ArtifactError::Ambiguous {
                name: path_name,
                candidates: result.into_iter().map(|c| c.full_path).collect(),
            }),
        }
    }

    /// Resolve and return only the class.
    pub fn load(&mut self, name: impl AsRef<OsStr>) -> Result<Arc<ContractClass>, ArtifactError> {
        Ok(self.resolve(name.as_ref())?.class)
    }
}

/// The two contract classes the amm fixtures deploy.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub amm: Arc<ContractClass>,
    pub erc20: Arc<ContractClass>,
}

impl Artifacts {
    pub fn load(
        resolver: &mut ContractClassResolver,
        config: &ArtifactsConfig,
    ) -> Result<Self, ArtifactError> {
        for path in &config.import_path {
            resolver.add_import_path(path);
        }

        Ok(Artifacts {
            amm: resolver.load(&config.amm)?,
            erc20: resolver.load(&config.erc20)?,
        })
    }
}
