//! 기울기 → 파라미터 집합 기록
//!
//! 기울기가 수렴할 때마다 전체 문서를 같은 디렉터리의 임시 파일에 쓰고 rename 한다.
//! 중간에 끊겨도 이전 문서나 새 문서 중 하나만 남는다.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::core::errors::SearchError;
use crate::core::types::ParameterSet;

/// 현재 문서 형식 버전
pub const RESULT_LOG_VERSION: u32 = 1;
/// 기울기 키 양자화 배율 (1e-6 dB/decade 단위)
pub const SLOPE_KEY_SCALE: f64 = 1e6;

/// 양자화된 기울기 키. 스텝 연산의 반올림 오차와 무관하게 같은 목표를 가리킨다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlopeKey(pub i64);

impl SlopeKey {
    pub fn from_slope(slope: f64) -> Self {
        SlopeKey((slope * SLOPE_KEY_SCALE).round() as i64)
    }

    pub fn slope(&self) -> f64 {
        self.0 as f64 / SLOPE_KEY_SCALE
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LogDocument {
    version: u32,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    entries: Vec<LogEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LogEntry {
    slope: f64,
    parameters: ParameterSet,
}

#[derive(Debug, Clone)]
pub struct ResultLog {
    path: Option<PathBuf>,
    entries: BTreeMap<SlopeKey, (f64, ParameterSet)>,
    updated_at: Option<DateTime<Utc>>,
}

impl ResultLog {
    /// 디스크에 쓰지 않는 기록
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
            updated_at: None,
        }
    }

    /// 파일에서 읽는다. 파일이 없거나 비어 있으면 빈 기록.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SearchError> {
        let path = path.as_ref().to_path_buf();
        let mut result_log = Self {
            path: Some(path.clone()),
            entries: BTreeMap::new(),
            updated_at: None,
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("result log {} not found, starting empty", path.display());
                return Ok(result_log);
            }
            Err(source) => return Err(SearchError::Io { path, source }),
        };
        if text.trim().is_empty() {
            return Ok(result_log);
        }

        let document: LogDocument = serde_json::from_str(&text)?;
        if document.version != RESULT_LOG_VERSION {
            return Err(SearchError::InvalidConfig(format!(
                "unsupported result log version {} in {}",
                document.version,
                path.display()
            )));
        }
        for entry in document.entries {
            if !entry.slope.is_finite() {
                return Err(SearchError::InvalidConfig(format!(
                    "non-finite slope {} in {}",
                    entry.slope,
                    path.display()
                )));
            }
            entry.parameters.validate()?;
            result_log.entries
                .insert(SlopeKey::from_slope(entry.slope), (entry.slope, entry.parameters));
        }
        result_log.updated_at = document.updated_at;
        log::info!("loaded {} recorded slopes from {}", result_log.len(), path.display());
        Ok(result_log)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, slope: f64) -> bool {
        self.entries.contains_key(&SlopeKey::from_slope(slope))
    }

    pub fn get(&self, slope: f64) -> Option<&ParameterSet> {
        self.entries
            .get(&SlopeKey::from_slope(slope))
            .map(|(_, params)| params)
    }

    /// 기울기 오름차순
    pub fn iter(&self) -> impl Iterator<Item = (f64, &ParameterSet)> + '_ {
        self.entries.values().map(|(slope, params)| (*slope, params))
    }

    /// 기록하고 파일이 있으면 곧바로 원자적으로 다시 쓴다
    pub fn insert(&mut self, slope: f64, params: ParameterSet) -> Result<(), SearchError> {
        if !slope.is_finite() {
            return Err(SearchError::InvalidParameter(format!(
                "cannot record non-finite slope {}",
                slope
            )));
        }
        params.validate()?;
        self.entries
            .insert(SlopeKey::from_slope(slope), (slope, params));
        self.updated_at = Some(Utc::now());
        self.persist()
    }

    /// 현재 내용을 파일에 쓴다. 메모리 기록이면 아무것도 하지 않는다.
    pub fn persist(&self) -> Result<(), SearchError> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };

        let document = LogDocument {
            version: RESULT_LOG_VERSION,
            updated_at: self.updated_at,
            entries: self
                .entries
                .values()
                .map(|(slope, params)| LogEntry {
                    slope: *slope,
                    parameters: params.clone(),
                })
                .collect(),
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let io_err = |source: io::Error| SearchError::Io {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut tmp, &document)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        log::debug!("result log written to {} ({} entries)", path.display(), self.len());
        Ok(())
    }

    /// 기록된 두 기울기 사이를 단별 이득의 선형 보간으로 채운다
    ///
    /// 범위 밖이면 가까운 끝점을 그대로 쓰고, 기록이 없으면 `None`.
    /// 무릎 주파수는 더 완만한(큰) 쪽 기록에서 가져온다.
    pub fn interpolate(&self, slope: f64) -> Result<Option<ParameterSet>, SearchError> {
        if !slope.is_finite() {
            return Err(SearchError::InvalidParameter(format!(
                "cannot interpolate at slope {}",
                slope
            )));
        }
        let key = SlopeKey::from_slope(slope);
        let below = self.entries.range(..=key).next_back().map(|(_, v)| v);
        let above = self.entries.range(key..).next().map(|(_, v)| v);

        let (low, high) = match (below, above) {
            (None, None) => return Ok(None),
            (Some((_, params)), None) | (None, Some((_, params))) => {
                return Ok(Some(params.clone()))
            }
            (Some(low), Some(high)) => (low, high),
        };
        let (low_slope, low_params) = low;
        let (high_slope, high_params) = high;
        if SlopeKey::from_slope(*low_slope) == SlopeKey::from_slope(*high_slope) {
            return Ok(Some(low_params.clone()));
        }
        if low_params.len() != high_params.len() {
            return Err(SearchError::InvalidParameter(format!(
                "recorded slopes {} and {} have different stage counts ({} vs {})",
                low_slope,
                high_slope,
                low_params.len(),
                high_params.len()
            )));
        }

        let t = (slope - low_slope) / (high_slope - low_slope);
        let mut result = high_params.clone();
        for (stage, (lo, hi)) in result
            .stages_mut()
            .iter_mut()
            .zip(low_params.iter().zip(high_params.iter()))
        {
            stage.gain = lo.gain + (hi.gain - lo.gain) * t;
        }
        Ok(Some(result))
    }
}
