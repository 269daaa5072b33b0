use serde_json::Value;

use crate::{
    animation::{cubic::CubicMapper, store::KeyframeStore, store::PushError},
    foundation::{
        core::Point,
        error::{LottieError, LottieResult},
        log::{LogLevel, Logger, report},
    },
    json::{self, FromJson},
};

/// How the weight within a keyframe interval is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mapping {
    /// Hold: the start value wins for the whole interval.
    Constant,
    Linear,
    /// Index into the track's cubic easing table.
    Cubic(u32),
}

/// One keyframe interval `[t0, t1)` between two value store entries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct KeyframeRecord {
    pub(crate) t0: f32,
    pub(crate) t1: f32,
    pub(crate) v0: u32,
    pub(crate) v1: u32,
    pub(crate) mapping: Mapping,
}

impl KeyframeRecord {
    fn contains(&self, t: f32) -> bool {
        self.t0 <= t && t < self.t1
    }
}

/// Result of a segment lookup: the bracketing value indices and the eased weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Segment {
    pub(crate) v0: u32,
    pub(crate) v1: u32,
    pub(crate) weight: f32,
}

impl Segment {
    fn hold(v: u32) -> Self {
        Self {
            v0: v,
            v1: v,
            weight: 0.0,
        }
    }
}

/// Sorted keyframe intervals plus their cubic easing table and a one-entry lookup cache.
#[derive(Clone, Debug)]
pub(crate) struct KeyframeTrack {
    records: Vec<KeyframeRecord>,
    cubics: Vec<CubicMapper>,
    cached: usize,
}

impl KeyframeTrack {
    #[cfg(test)]
    pub(crate) fn records(&self) -> &[KeyframeRecord] {
        &self.records
    }

    #[cfg(test)]
    pub(crate) fn cubic_count(&self) -> usize {
        self.cubics.len()
    }

    /// A collapsed track: a single hold record whose ends reference the same value.
    pub(crate) fn is_constant(&self) -> bool {
        matches!(self.records.as_slice(), [r] if r.v0 == r.v1)
    }

    /// Locate the interval containing `t` (half-open `[t0, t1)`) and compute its weight.
    pub(crate) fn locate(&mut self, t: f32) -> Segment {
        let first = self.records[0];
        // NaN also lands here.
        if !(t > first.t0) {
            return Segment::hold(first.v0);
        }
        let last = self.records[self.records.len() - 1];
        if t >= last.t1 {
            return Segment::hold(last.v1);
        }

        let idx = if self.records[self.cached].contains(t) {
            self.cached
        } else {
            let idx = self
                .records
                .partition_point(|r| r.t1 <= t)
                .min(self.records.len() - 1);
            self.cached = idx;
            idx
        };

        let rec = self.records[idx];
        let span = rec.t1 - rec.t0;
        let weight = match rec.mapping {
            Mapping::Constant => 0.0,
            _ if span <= 0.0 => 0.0,
            Mapping::Linear => ((t - rec.t0) / span).clamp(0.0, 1.0),
            Mapping::Cubic(i) => self.cubics[i as usize].map(((t - rec.t0) / span).clamp(0.0, 1.0)),
        };

        Segment {
            v0: rec.v0,
            v1: rec.v1,
            weight,
        }
    }
}

struct PendingRecord {
    t0: f32,
    t1: f32,
    v0: u32,
    v1: Option<u32>,
    mapping: Mapping,
}

impl PendingRecord {
    fn is_valid(&self) -> bool {
        match self.v1 {
            Some(v1) => self.t0 < self.t1 || self.v0 == v1,
            None => false,
        }
    }
}

/// Build a keyframe track from a Lottie keyframe array.
///
/// Handles both the regular encoding (`t`/`s` per entry, end value taken from the next entry)
/// and the legacy one (explicit `e` end values, trailing `t`-only sentinel). Malformed entries
/// are skipped with a warning; `Err` means the whole property failed to bind.
pub(crate) fn parse_keyframes<S: KeyframeStore>(
    jkfs: &[Value],
    store: &mut S,
    logger: &dyn Logger,
) -> LottieResult<KeyframeTrack> {
    let mut pending: Vec<PendingRecord> = Vec::with_capacity(jkfs.len());
    let mut cubics: Vec<CubicMapper> = Vec::new();

    for jkf in jkfs {
        let Some(t) = json::parse::<f32>(&jkf["t"]).filter(|t| t.is_finite()) else {
            report(logger, LogLevel::Warning, "Skipping keyframe without a valid time.", Some(jkf));
            continue;
        };

        let value = push_value(store, &jkf["s"], jkf)?;

        if let Some(prev) = pending.last_mut() {
            if t <= prev.t1 {
                report(logger, LogLevel::Warning, "Ignoring out-of-order keyframe.", Some(jkf));
                continue;
            }
            prev.t1 = t;
            if prev.v1.is_none() {
                prev.v1 = value;
            }
        }

        let Some(v0) = value else {
            // Sentinel entries only close the previous interval.
            continue;
        };

        let hold = store.is_discrete() || json::parse_or::<bool>(&jkf["h"], false);
        let (v1, mapping) = if hold {
            (Some(v0), Mapping::Constant)
        } else {
            let end = push_value(store, &jkf["e"], &Value::Null)?;
            (end, parse_mapping(jkf, &mut cubics))
        };

        pending.push(PendingRecord {
            t0: t,
            t1: t,
            v0,
            v1,
            mapping,
        });
    }

    if pending.len() > 1 && pending.last().is_some_and(|r| !r.is_valid()) {
        pending.pop();
    }
    if let [only] = pending.as_mut_slice()
        && !only.is_valid()
    {
        only.v1 = Some(only.v0);
        only.mapping = Mapping::Constant;
    }

    let mut records: Vec<KeyframeRecord> = pending
        .into_iter()
        .filter_map(|p| {
            Some(KeyframeRecord {
                t0: p.t0,
                t1: p.t1,
                v0: p.v0,
                v1: p.v1?,
                mapping: p.mapping,
            })
        })
        .collect();

    let Some(first) = records.first().copied() else {
        return Err(LottieError::parse("Could not parse keyframed property."));
    };

    let all_equal = records
        .iter()
        .all(|r| store.same_value(r.v0, first.v0) && store.same_value(r.v1, first.v0));
    if all_equal {
        records = vec![KeyframeRecord {
            t0: first.t0,
            t1: first.t0,
            v0: first.v0,
            v1: first.v0,
            mapping: Mapping::Constant,
        }];
        cubics.clear();
    }

    store.finish(&records);

    Ok(KeyframeTrack {
        records,
        cubics,
        cached: 0,
    })
}

fn push_value<S: KeyframeStore>(
    store: &mut S,
    jv: &Value,
    jkf: &Value,
) -> LottieResult<Option<u32>> {
    if jv.is_null() {
        return Ok(None);
    }
    match store.push(jv, jkf) {
        Ok(idx) => Ok(Some(idx)),
        Err(PushError::Unparseable) => Ok(None),
        Err(PushError::Incompatible(err)) => Err(err),
    }
}

fn parse_mapping(jkf: &Value, cubics: &mut Vec<CubicMapper>) -> Mapping {
    // "o" is the out handle of this keyframe (first control point), "i" the in handle of the next.
    let (Some(c1), Some(c2)) = (Point::from_json(&jkf["o"]), Point::from_json(&jkf["i"])) else {
        return Mapping::Linear;
    };
    if CubicMapper::is_linear(c1, c2) {
        return Mapping::Linear;
    }

    let mapper = CubicMapper::new(c1, c2);
    match cubics.last() {
        Some(last) if last.same_controls(&mapper) => {}
        _ => cubics.push(mapper),
    }
    Mapping::Cubic((cubics.len() - 1) as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframe.rs"]
mod tests;
