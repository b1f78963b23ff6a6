//! Multi-bounce ray tracing
//!
//! The tracer walks the ray from the emitter, one element interaction per
//! iteration, until it reaches the receptor or leaves the scene bounds. A
//! ray that would enter one element more than the bounce cap allows stops
//! at that element's edge. It is a pure function of the layout and the
//! placed elements: identical inputs always produce an identical path.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::element::{Deflection, EdgeKind, Footprint, ReflectiveElement};
use super::geometry::{Segment, ray_to_rect};
use super::layout::{SceneLayout, SlotId};
use crate::consts::MIN_HIT_DISTANCE;
use crate::settings::Settings;

/// Why tracing stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terminal {
    HitReceptor,
    ExitedBounds,
    /// Iteration cap reached; an ordinary unsolved outcome
    MaxBouncesReached,
}

impl Terminal {
    pub fn is_hit(self) -> bool {
        self == Terminal::HitReceptor
    }
}

/// Where a path segment runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Open scene
    Free,
    /// Inside an element
    Internal,
}

/// One drawn piece of the path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub from: Vec2,
    pub to: Vec2,
    pub kind: SegmentKind,
}

/// What the ray did inside an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Entered a leg and bounced off the hypotenuse
    Reflected,
    /// Crossed the hypotenuse from outside
    PassedThrough,
}

/// One path vertex: the ray entered an element and left it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub slot: SlotId,
    pub element: String,
    pub kind: InteractionKind,
    pub incoming: Direction,
    pub outgoing: Direction,
    pub entry: Vec2,
    pub exit: Vec2,
}

/// Complete traced path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracePath {
    pub segments: Vec<PathSegment>,
    pub interactions: Vec<Interaction>,
    pub terminal: Terminal,
}

impl TracePath {
    /// Where the drawn path ends
    pub fn end_point(&self) -> Option<Vec2> {
        self.segments.last().map(|s| s.to)
    }

    pub fn final_segment(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Number of hypotenuse reflections along the path
    pub fn bounce_count(&self) -> usize {
        self.interactions
            .iter()
            .filter(|i| i.kind == InteractionKind::Reflected)
            .count()
    }

    /// Total drawn length
    pub fn length(&self) -> f32 {
        self.segments.iter().map(|s| (s.to - s.from).length()).sum()
    }

    pub fn reaches_receptor(&self) -> bool {
        self.terminal.is_hit()
    }
}

/// An element resolved against its slot
struct Placed<'a> {
    element: &'a ReflectiveElement,
    footprint: Footprint,
}

/// First edge a ray meets on some element
struct ElementHit {
    index: usize,
    edge: EdgeKind,
    point: Vec2,
    distance: f32,
}

/// Trace the ray through the placed elements
///
/// Elements whose slot is not part of the layout are ignored. Iteration
/// order follows the layout's slot order, so ties resolve the same way on
/// every run. At most `settings.bounce_cap` element interactions are
/// followed; reaching the receptor or the bounds never counts against it.
pub fn trace<'a, E>(layout: &SceneLayout, elements: E, settings: &Settings) -> TracePath
where
    E: IntoIterator<Item = &'a ReflectiveElement>,
{
    let mut resolved: Vec<(usize, Placed<'a>)> = elements
        .into_iter()
        .filter_map(|element| {
            let Some(index) = layout.slot_index(&element.slot) else {
                log::debug!(
                    "Ignoring element '{}' in unknown slot '{}'",
                    element.id,
                    element.slot
                );
                return None;
            };
            let center = layout.slots()[index].position;
            let footprint = element.footprint(center, layout.element_half_size());
            Some((index, Placed { element, footprint }))
        })
        .collect();
    resolved.sort_by_key(|(index, _)| *index);
    let placed: Vec<Placed<'a>> = resolved.into_iter().map(|(_, p)| p).collect();

    let bounds = *layout.bounds();
    let receptor = layout.receptor().rect();
    let cast_length = bounds.diagonal() + 1.0;

    let mut point = layout.emitter().position;
    let mut heading = layout.emitter().direction;
    let mut just_exited: Option<usize> = None;
    let mut segments = Vec::new();
    let mut interactions = Vec::new();

    let finish = |segments: Vec<PathSegment>, interactions: Vec<Interaction>, terminal| {
        TracePath {
            segments,
            interactions,
            terminal,
        }
    };

    loop {
        if receptor.contains(point) {
            return finish(segments, interactions, Terminal::HitReceptor);
        }
        if !bounds.contains(point) {
            return finish(segments, interactions, Terminal::ExitedBounds);
        }

        let dir = heading.to_vec();
        let ray = Segment::cast(point, dir, cast_length);

        let receptor_hit = ray_to_rect(point, dir, &receptor).map(|p| (p, p.distance(point)));
        let element_hit = nearest_element_hit(&placed, just_exited, &ray);

        match (receptor_hit, element_hit) {
            (Some((hit, distance)), element_hit)
                if element_hit.as_ref().is_none_or(|e| distance <= e.distance) =>
            {
                segments.push(free(point, hit));
                return finish(segments, interactions, Terminal::HitReceptor);
            }
            (_, Some(hit)) => {
                segments.push(free(point, hit.point));
                if interactions.len() >= settings.bounce_cap as usize {
                    log::debug!(
                        "Trace hit the cap of {} interactions in '{}'",
                        settings.bounce_cap,
                        layout.id()
                    );
                    return finish(segments, interactions, Terminal::MaxBouncesReached);
                }
                let interaction = pass_through_element(&placed[hit.index], &hit, heading, &mut segments);
                point = interaction.exit;
                heading = interaction.outgoing;
                just_exited = Some(hit.index);
                interactions.push(interaction);
            }
            (_, None) => {
                let exit = ray_to_rect(point, dir, &bounds).unwrap_or(point);
                segments.push(free(point, exit));
                return finish(segments, interactions, Terminal::ExitedBounds);
            }
        }
    }
}

fn free(from: Vec2, to: Vec2) -> PathSegment {
    PathSegment {
        from,
        to,
        kind: SegmentKind::Free,
    }
}

fn internal(from: Vec2, to: Vec2) -> PathSegment {
    PathSegment {
        from,
        to,
        kind: SegmentKind::Internal,
    }
}

/// Nearest edge crossing among all elements except `skip`
///
/// Legs are listed before the hypotenuse, so a ray grazing the shared
/// vertex enters through the leg.
fn nearest_element_hit(placed: &[Placed], skip: Option<usize>, ray: &Segment) -> Option<ElementHit> {
    let mut best: Option<ElementHit> = None;

    for (index, p) in placed.iter().enumerate() {
        if Some(index) == skip {
            continue;
        }
        for (edge, segment) in p.footprint.edges() {
            let Some(point) = ray.intersect(&segment) else {
                continue;
            };
            let distance = point.distance(ray.from);
            if distance <= MIN_HIT_DISTANCE {
                continue;
            }
            if best.as_ref().is_none_or(|b| distance < b.distance) {
                best = Some(ElementHit {
                    index,
                    edge,
                    point,
                    distance,
                });
            }
        }
    }

    best
}

/// Route the ray through the element it just met
///
/// Pushes the internal segments and returns the interaction, whose `exit`
/// and `outgoing` are where tracing resumes.
fn pass_through_element(
    placed: &Placed,
    hit: &ElementHit,
    incoming: Direction,
    segments: &mut Vec<PathSegment>,
) -> Interaction {
    let footprint = &placed.footprint;
    let reach = footprint.bounds().diagonal() * 2.0;
    let dir = incoming.to_vec();
    let entry = hit.point;

    let interaction = |kind, outgoing, exit| Interaction {
        slot: placed.element.slot.clone(),
        element: placed.element.id.clone(),
        kind,
        incoming,
        outgoing,
        entry,
        exit,
    };

    if let EdgeKind::Leg(entered) = hit.edge {
        if let Deflection::Turned(outgoing) = placed.element.deflect(incoming) {
            let inside = Segment::cast(entry, dir, reach);
            if let Some(bounce) = inside.intersect(&footprint.hypotenuse()) {
                let other_leg = footprint.legs()[1 - entered];
                let exit = Segment::cast(bounce, outgoing.to_vec(), reach)
                    .intersect(&other_leg)
                    .unwrap_or(bounce);
                segments.push(internal(entry, bounce));
                segments.push(internal(bounce, exit));
                return interaction(InteractionKind::Reflected, outgoing, exit);
            }
        }
    }

    // Hypotenuse from outside (or a grazing contact): keep heading, leave
    // through whichever leg lies ahead.
    let inside = Segment::cast(entry, dir, reach);
    let exit = footprint
        .legs()
        .iter()
        .filter_map(|leg| inside.intersect(leg))
        .filter(|p| p.distance(entry) > MIN_HIT_DISTANCE)
        .min_by(|a, b| {
            a.distance_squared(entry)
                .partial_cmp(&b.distance_squared(entry))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(entry);
    segments.push(internal(entry, exit));
    interaction(InteractionKind::PassedThrough, incoming, exit)
}
