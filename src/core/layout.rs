//! Stack layout engine.
//!
//! Turns a flat list of assessment records into Jenga-style towers: one
//! tower per ascending numeric grade, blocks packed in alternating-axis
//! rows, plus a grade label per tower and a camera focal point per
//! completed tower. Pure: the same records and config always produce the
//! same scene, and nothing outside the returned value is touched.

use crate::domain::model::{
    AssessmentRecord, BlockKind, BlockPlacement, LayoutConfig, Scene, StackCenter, StackLabel,
};
use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Lay out `records` into block placements, stack labels, and stack centers.
///
/// Records are sorted by (grade string, domain, cluster, standard id) and
/// grouped by grade string. A new tower starts when the parsed leading
/// grade digit strictly increases. Malformed grades (leading character not
/// 1-9) drop their whole group; mastery codes outside 0..=2 drop the single
/// record without consuming a block slot. Consecutive records that differ
/// only in id and mastery collapse into the earlier block, keeping the
/// earlier id but taking the later mastery. Never fails; empty or fully
/// skipped input yields an empty scene.
pub fn layout(records: &[AssessmentRecord], config: &LayoutConfig) -> Scene {
    let mut scene = Scene::default();

    let mut sorted: Vec<&AssessmentRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        a.grade
            .cmp(&b.grade)
            .then_with(|| a.domain.cmp(&b.domain))
            .then_with(|| a.cluster.cmp(&b.cluster))
            .then_with(|| a.standard_id.cmp(&b.standard_id))
    });

    let Some(first) = sorted.first() else {
        return scene;
    };

    let quarter_turn = Quat::from_rotation_y(FRAC_PI_2);

    let mut stack_pos = config.first_stack_pos;
    let mut block_pos = stack_pos;
    let mut block_rot = config.first_stack_rot;
    let mut row_count = 1usize;
    let mut rotated = false;
    let mut stack_empty = true;
    // Only observable once the first block lands, at which point the grade
    // parsed successfully; the 0 fallback is inert.
    let mut current_grade = leading_grade_digit(&first.grade).unwrap_or(0);

    for group in sorted.chunk_by(|a, b| a.grade == b.grade) {
        // Malformed grade: the whole group is dropped and the open stack
        // loses its closing center. A later valid group starts fresh
        // bookkeeping without emitting a center for the dropped group.
        let Some(grade) = leading_grade_digit(&group[0].grade) else {
            stack_empty = true;
            continue;
        };

        if !stack_empty {
            scene.centers.push(stack_center(stack_pos, block_pos, block_rot));
        }

        if grade > current_grade && !stack_empty {
            current_grade = grade;
            stack_pos.x += config.distance_between_stacks;
            block_pos = stack_pos;
            // Undo the row alternation so the new tower starts unrotated.
            if rotated {
                block_rot *= quarter_turn;
                rotated = false;
            }
            row_count = 1;
            stack_empty = true;
        }

        for record in group {
            // Consecutive duplicate: fold into the previously emitted block.
            // The stored mastery always takes the later value; the visual
            // kind only changes when the later mastery is a valid code.
            if let Some(previous) = scene.placements.last_mut() {
                if record.same_standard(&previous.record) {
                    previous.record.mastery = record.mastery;
                    if let Some(kind) = BlockKind::from_mastery(record.mastery) {
                        previous.kind = kind;
                    }
                    continue;
                }
            }

            let Some(kind) = BlockKind::from_mastery(record.mastery) else {
                continue;
            };

            scene.placements.push(BlockPlacement {
                position: block_pos,
                rotation: block_rot,
                kind,
                record: (*record).clone(),
            });

            if stack_empty {
                scene.labels.push(StackLabel {
                    position: Vec3::new(
                        block_pos.x + config.block_width,
                        block_pos.y + config.block_height * 2.0,
                        block_pos.z - config.block_height * 3.0,
                    ),
                    text: record.grade.clone(),
                });
                stack_empty = false;
            }

            if row_count >= config.blocks_per_row {
                row_count = 1;
                block_rot *= quarter_turn;
                rotated = !rotated;
                block_pos = if rotated {
                    Vec3::new(
                        stack_pos.x + config.block_width,
                        block_pos.y + config.block_height,
                        stack_pos.z - config.block_width,
                    )
                } else {
                    Vec3::new(stack_pos.x, block_pos.y + config.block_height, stack_pos.z)
                };
            } else {
                if rotated {
                    block_pos.z += config.block_width;
                } else {
                    block_pos.x += config.block_width;
                }
                row_count += 1;
            }
        }
    }

    if !stack_empty {
        scene.centers.push(stack_center(stack_pos, block_pos, block_rot));
    }

    scene
}

/// Leading grade digit, restricted to 1-9. The data set documents
/// single-digit grades only; "0" and "K" count as malformed, while a
/// multi-character grade like "10" groups under its leading digit.
fn leading_grade_digit(grade: &str) -> Option<u32> {
    grade
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .filter(|d| (1..=9).contains(d))
}

/// Focal point halfway up the tower, at the stack origin in x/z.
fn stack_center(stack_pos: Vec3, block_pos: Vec3, block_rot: Quat) -> StackCenter {
    StackCenter {
        position: Vec3::new(stack_pos.x, block_pos.y / 2.0, stack_pos.z),
        rotation: block_rot,
    }
}
