//! Detector error model text format
//!
//! ```text
//! error(0.01) D0 D1
//! error(0.002) D1 ^ D2 L0
//! detector(1, 0) D0
//! shift_detectors(0, 1) 2
//! repeat 3 {
//!     error(0.01) D0 D2
//!     shift_detectors 2
//! }
//! logical_observable L0
//! ```

use crate::types::{DetectorErrorModel, ErrorMechanism, Symptom};
use crate::{DemError, Result};

/// A parsed line, before `repeat` expansion and detector offsets
#[derive(Debug, Clone)]
enum DemItem {
    Error {
        line: usize,
        probability: f64,
        components: Vec<(Vec<u32>, u64)>,
    },
    Detector {
        coords: Vec<f64>,
        ids: Vec<u32>,
    },
    Observable(Vec<u32>),
    Shift {
        coords: Vec<f64>,
        offset: u32,
    },
    Repeat {
        count: usize,
        body: Vec<DemItem>,
    },
}

/// Parse DEM text
///
/// # Errors
/// `Parse { line, .. }` for malformed lines or unbalanced `repeat` blocks,
/// `InvalidProbability` for error probabilities outside `[0, 1]`
pub fn parse_dem(text: &str) -> Result<DetectorErrorModel> {
    let items = parse_items(text)?;
    let mut builder = Builder::default();
    builder.run(&items)?;
    Ok(builder.finish())
}

fn parse_items(text: &str) -> Result<Vec<DemItem>> {
    // (count, opening line, enclosing items)
    let mut stack: Vec<(usize, usize, Vec<DemItem>)> = Vec::new();
    let mut current: Vec<DemItem> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        if line == "}" {
            let (count, _, parent) = stack
                .pop()
                .ok_or_else(|| DemError::parse(line_no, "unmatched '}'"))?;
            let body = std::mem::replace(&mut current, parent);
            current.push(DemItem::Repeat { count, body });
            continue;
        }
        if let Some(count) = parse_repeat_header(line, line_no)? {
            stack.push((count, line_no, std::mem::take(&mut current)));
            continue;
        }
        current.push(parse_line(line, line_no)?);
    }

    if let Some((_, opened, _)) = stack.last() {
        return Err(DemError::parse(*opened, "repeat block is never closed"));
    }
    Ok(current)
}

fn parse_repeat_header(line: &str, line_no: usize) -> Result<Option<usize>> {
    let Some(rest) = line.strip_prefix("repeat") else {
        return Ok(None);
    };
    let Some(count) = rest.trim().strip_suffix('{') else {
        return Ok(None);
    };
    let count: usize = count
        .trim()
        .parse()
        .map_err(|_| DemError::parse(line_no, format!("bad repeat count in '{}'", line)))?;
    if count == 0 {
        return Err(DemError::parse(line_no, "repeat count must be positive"));
    }
    Ok(Some(count))
}

/// Split `name(args) rest` into its parts
fn split_head(line: &str) -> (&str, Option<&str>, &str) {
    let name_end = line
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(line.len());
    let name = &line[..name_end];
    let rest = &line[name_end..];
    if let Some(inner) = rest.strip_prefix('(') {
        if let Some(close) = inner.find(')') {
            return (name, Some(&inner[..close]), inner[close + 1..].trim());
        }
    }
    (name, None, rest.trim())
}

fn parse_args(args: Option<&str>, line_no: usize) -> Result<Vec<f64>> {
    let Some(args) = args else {
        return Ok(Vec::new());
    };
    args.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| {
            a.parse::<f64>()
                .map_err(|_| DemError::parse(line_no, format!("bad number '{}'", a)))
        })
        .collect()
}

fn parse_id(token: &str, prefix: char, line_no: usize) -> Result<u32> {
    token
        .strip_prefix(prefix)
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| DemError::parse(line_no, format!("expected {}<n>, got '{}'", prefix, token)))
}

fn parse_line(line: &str, line_no: usize) -> Result<DemItem> {
    if line.contains('(') && !line.contains(')') {
        return Err(DemError::parse(line_no, "unclosed '('"));
    }
    let (name, args, rest) = split_head(line);
    let args = parse_args(args, line_no)?;
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    match name {
        "error" => {
            let probability = match args.as_slice() {
                [p] => *p,
                _ => return Err(DemError::parse(line_no, "error takes one probability")),
            };
            if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
                return Err(DemError::invalid_probability(
                    format!("line {}: {}", line_no, line),
                    probability,
                ));
            }
            let mut components = vec![(Vec::new(), 0u64)];
            for token in tokens {
                if token == "^" {
                    components.push((Vec::new(), 0));
                    continue;
                }
                let (detectors, observables) = components
                    .last_mut()
                    .ok_or_else(|| DemError::parse(line_no, "empty error"))?;
                if token.starts_with('D') {
                    detectors.push(parse_id(token, 'D', line_no)?);
                } else {
                    let k = parse_id(token, 'L', line_no)?;
                    if k >= 64 {
                        return Err(DemError::TooManyObservables(k as usize + 1));
                    }
                    *observables ^= 1 << k;
                }
            }
            Ok(DemItem::Error {
                line: line_no,
                probability,
                components,
            })
        }
        "detector" => Ok(DemItem::Detector {
            coords: args,
            ids: tokens
                .iter()
                .map(|t| parse_id(t, 'D', line_no))
                .collect::<Result<_>>()?,
        }),
        "logical_observable" => Ok(DemItem::Observable(
            tokens
                .iter()
                .map(|t| parse_id(t, 'L', line_no))
                .collect::<Result<_>>()?,
        )),
        "shift_detectors" => {
            let offset = match tokens.as_slice() {
                [n] => n
                    .parse()
                    .map_err(|_| DemError::parse(line_no, format!("bad shift '{}'", n)))?,
                [] => 0,
                _ => return Err(DemError::parse(line_no, "shift_detectors takes one offset")),
            };
            Ok(DemItem::Shift {
                coords: args,
                offset,
            })
        }
        other => Err(DemError::parse(line_no, format!("unknown instruction '{}'", other))),
    }
}

/// Expands items into a flat model
#[derive(Default)]
struct Builder {
    detector_offset: u32,
    coord_offset: Vec<f64>,
    num_detectors: usize,
    num_observables: usize,
    coords: Vec<(usize, Vec<f64>)>,
    mechanisms: Vec<ErrorMechanism>,
}

impl Builder {
    fn run(&mut self, items: &[DemItem]) -> Result<()> {
        for item in items {
            match item {
                DemItem::Error {
                    line,
                    probability,
                    components,
                } => {
                    let components = components
                        .iter()
                        .map(|(dets, obs)| {
                            Symptom::new(dets.iter().map(|d| d + self.detector_offset), *obs)
                        })
                        .collect::<Vec<_>>();
                    if components.len() > 1 && components.iter().any(Symptom::is_empty) {
                        return Err(DemError::parse(*line, "empty component around '^'"));
                    }
                    for component in &components {
                        self.see_symptom(component);
                    }
                    self.mechanisms.push(ErrorMechanism {
                        probability: *probability,
                        components,
                    });
                }
                DemItem::Detector { coords, ids } => {
                    for &id in ids {
                        let id = (id + self.detector_offset) as usize;
                        self.num_detectors = self.num_detectors.max(id + 1);
                        if !coords.is_empty() {
                            let shifted = coords
                                .iter()
                                .enumerate()
                                .map(|(i, c)| c + self.coord_offset.get(i).copied().unwrap_or(0.0))
                                .collect();
                            self.coords.push((id, shifted));
                        }
                    }
                }
                DemItem::Observable(ids) => {
                    for &k in ids {
                        if k >= 64 {
                            return Err(DemError::TooManyObservables(k as usize + 1));
                        }
                        self.num_observables = self.num_observables.max(k as usize + 1);
                    }
                }
                DemItem::Shift { coords, offset } => {
                    self.detector_offset += offset;
                    if self.coord_offset.len() < coords.len() {
                        self.coord_offset.resize(coords.len(), 0.0);
                    }
                    for (acc, c) in self.coord_offset.iter_mut().zip(coords) {
                        *acc += c;
                    }
                }
                DemItem::Repeat { count, body } => {
                    for _ in 0..*count {
                        self.run(body)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn see_symptom(&mut self, symptom: &Symptom) {
        if let Some(&max) = symptom.detectors.last() {
            self.num_detectors = self.num_detectors.max(max as usize + 1);
        }
        if symptom.observables != 0 {
            let highest = 64 - symptom.observables.leading_zeros() as usize;
            self.num_observables = self.num_observables.max(highest);
        }
    }

    fn finish(self) -> DetectorErrorModel {
        let mut detector_coords = vec![Vec::new(); self.num_detectors];
        for (id, coords) in self.coords {
            detector_coords[id] = coords;
        }
        DetectorErrorModel {
            num_detectors: self.num_detectors,
            num_observables: self.num_observables,
            detector_coords,
            mechanisms: self.mechanisms,
        }
    }
}
