//! Land outlines - one-shot background fetch and TopoJSON decoding
//!
//! The fetch runs on its own thread and reports over a channel; the frame
//! loop polls it. Any failure leaves the map with grid and markers only.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use serde::Deserialize;
use thiserror::Error;

use crate::world_map::project;

/// A closed outline in projected map coordinates
pub type Ring = Vec<(f32, f32)>;

#[derive(Debug, Error)]
pub enum LandError {
    #[error("geometry request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geometry is not valid TopoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("topology has no `land` object")]
    MissingLand,
    #[error("arc index {0} out of range")]
    BadArc(i64),
}

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    objects: HashMap<String, Geometry>,
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    GeometryCollection { geometries: Vec<Geometry> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
    #[serde(other)]
    Other,
}

/// Absolute (lon, lat) positions for every arc
fn decode_arcs(topology: &Topology) -> Vec<Vec<(f64, f64)>> {
    topology
        .arcs
        .iter()
        .map(|arc| {
            let positions = arc.iter().filter_map(|p| Some((*p.first()?, *p.get(1)?)));
            match topology.transform {
                Some(t) => {
                    // Quantized arcs are delta-encoded
                    let (mut x, mut y) = (0.0, 0.0);
                    positions
                        .map(|(dx, dy)| {
                            x += dx;
                            y += dy;
                            (x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                        })
                        .collect()
                }
                None => positions.collect(),
            }
        })
        .collect()
}

/// Stitch a ring from arc references; `!i` means arc `i` reversed
fn stitch_ring(arcs: &[Vec<(f64, f64)>], refs: &[i64]) -> Result<Ring, LandError> {
    let mut ring = Ring::new();
    for &index in refs {
        let (slot, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(slot)
            .ok()
            .and_then(|slot| arcs.get(slot))
            .ok_or(LandError::BadArc(index))?;

        let points: Box<dyn Iterator<Item = &(f64, f64)>> = if reversed {
            Box::new(arc.iter().rev())
        } else {
            Box::new(arc.iter())
        };
        // Consecutive arcs share their joining point
        let skip = usize::from(!ring.is_empty());
        ring.extend(
            points
                .skip(skip)
                .map(|&(lon, lat)| project(lon as f32, lat as f32)),
        );
    }
    Ok(ring)
}

fn collect_rings(
    geometry: &Geometry,
    arcs: &[Vec<(f64, f64)>],
    out: &mut Vec<Ring>,
) -> Result<(), LandError> {
    match geometry {
        Geometry::GeometryCollection { geometries } => {
            for child in geometries {
                collect_rings(child, arcs, out)?;
            }
        }
        Geometry::Polygon { arcs: rings } => {
            for refs in rings {
                out.push(stitch_ring(arcs, refs)?);
            }
        }
        Geometry::MultiPolygon { arcs: polygons } => {
            for refs in polygons.iter().flatten() {
                out.push(stitch_ring(arcs, refs)?);
            }
        }
        Geometry::Other => {}
    }
    Ok(())
}

/// Decode the `land` object of a TopoJSON document into projected rings
pub fn decode_land(json: &str) -> Result<Vec<Ring>, LandError> {
    let topology: Topology = serde_json::from_str(json)?;
    let land = topology.objects.get("land").ok_or(LandError::MissingLand)?;
    let arcs = decode_arcs(&topology);

    let mut rings = Vec::new();
    collect_rings(land, &arcs, &mut rings)?;
    rings.retain(|ring| ring.len() > 2);
    Ok(rings)
}

fn fetch_land(url: &str) -> Result<Vec<Ring>, LandError> {
    let body = reqwest::blocking::get(url)?.error_for_status()?.text()?;
    decode_land(&body)
}

/// Where the outlines stand
#[derive(Debug)]
pub enum LandState {
    Loading(Receiver<Result<Vec<Ring>, LandError>>),
    Ready(Vec<Ring>),
    Unavailable,
}

impl LandState {
    /// Start the fire-once fetch; no retry, no timeout policy
    pub fn fetch(url: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        let url = url.to_string();
        let spawned = thread::Builder::new()
            .name("land-fetch".to_string())
            .spawn(move || {
                log::debug!("fetching land geometry from {}", url);
                let _ = tx.send(fetch_land(&url));
            });
        match spawned {
            Ok(_) => LandState::Loading(rx),
            Err(e) => {
                log::debug!("could not start land fetch: {}", e);
                LandState::Unavailable
            }
        }
    }

    /// Pick up a finished fetch; returns true when the state changed
    pub fn poll(&mut self) -> bool {
        let LandState::Loading(rx) = self else {
            return false;
        };
        let next = match rx.try_recv() {
            Ok(Ok(rings)) => {
                log::debug!("land geometry ready ({} rings)", rings.len());
                LandState::Ready(rings)
            }
            Ok(Err(e)) => {
                log::debug!("land geometry unavailable: {}", e);
                LandState::Unavailable
            }
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => LandState::Unavailable,
        };
        *self = next;
        true
    }

    pub fn rings(&self) -> &[Ring] {
        match self {
            LandState::Ready(rings) => rings,
            _ => &[],
        }
    }
}
