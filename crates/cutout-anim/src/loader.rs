//! Text asset loading.
//!
//! Assets are line-oriented, comma-separated records keyed by a tag in
//! column 0. A file starts with either a single-sheet header
//!
//! ```text
//! SPRITESHEET_FILENAME,hero.png
//! TOTAL_NUM_PARTS,6
//! ROOT_INDEX,0
//! TOTAL_ANIMATIONS,3
//! ```
//!
//! or a combined-sheet header
//! `COMBO_FILENAME,<path>,<..>,<..>,<total parts>,<total animations>` whose
//! body is split into sections, each opened by its own
//! `SPRITESHEET_FILENAME` record. Part indices inside a section are
//! relative to the section's first `PART_INDEX`.
//!
//! Animations of a single-sheet file are registered under the section `""`;
//! animations of a combined sheet under the file stem of their section's
//! sheet name.

use std::fs;
use std::ops::Range;
use std::path::Path;

use cutout_common::{BoxClass, LoadError, LoadResult, Rect};
use glam::{Vec2, Vec3};
use tracing::{debug, info, trace};

use crate::boxes::{BoundingBox, BoxKey};
use crate::keyframe::{KeyGridBuilder, Keyframe};
use crate::library::AnimationLibrary;
use crate::part::Part;
use crate::timeline::Timeline;

/// Loads an asset file. `rescale` multiplies every authored length.
pub fn load_file(path: impl AsRef<Path>, rescale: Vec2) -> LoadResult<AnimationLibrary> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    debug!("Loading animation asset {:?}", path);
    load_str(&text, rescale)
}

/// Parses asset text. `rescale` multiplies every authored length (part
/// corners, key positions, distortion offsets and box rectangles).
pub fn load_str(text: &str, rescale: Vec2) -> LoadResult<AnimationLibrary> {
    let all: Vec<Record<'_>> = text
        .lines()
        .enumerate()
        .map(|(i, line)| Record::parse(i + 1, line))
        .filter(|record| !record.tag.is_empty())
        .collect();
    // every declared part, key and box key needs at least one record
    let limit = all.len();
    let mut records = all.into_iter();

    let header = records.next().ok_or(LoadError::MissingHeader)?;
    let mut loader = match header.tag {
        "SPRITESHEET_FILENAME" => {
            let sheet = header.text(1)?;
            let parts =
                expect_record(records.next(), header.line, "TOTAL_NUM_PARTS")?.count(1, limit)?;
            let root = expect_record(records.next(), header.line, "ROOT_INDEX")?.index(1)?;
            let animations =
                expect_record(records.next(), header.line, "TOTAL_ANIMATIONS")?.count(1, limit)?;
            let mut loader = Loader::new(sheet, parts, animations, limit, rescale);
            loader.part_count = parts;
            loader.root = root;
            loader
        },
        "COMBO_FILENAME" => {
            let sheet = header.text(1)?;
            let parts = header.count(4, limit)?;
            let animations = header.count(5, limit)?;
            Loader::new(sheet, parts, animations, limit, rescale)
        },
        other => {
            return Err(LoadError::UnexpectedHeader {
                found: other.to_string(),
            })
        },
    };

    for record in records {
        loader.apply(&record)?;
    }
    loader.finish()
}

fn expect_record<'a>(
    record: Option<Record<'a>>,
    header_line: usize,
    expected: &'static str,
) -> LoadResult<Record<'a>> {
    match record {
        Some(record) if record.tag == expected => Ok(record),
        Some(record) => Err(LoadError::MissingRecord {
            line: record.line,
            expected,
        }),
        None => Err(LoadError::MissingRecord {
            line: header_line + 1,
            expected,
        }),
    }
}

/// One split line of the asset.
struct Record<'a> {
    line: usize,
    tag: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    fn parse(line: usize, text: &'a str) -> Self {
        let fields: Vec<&str> = text.split(',').map(str::trim).collect();
        Self {
            line,
            tag: fields.first().copied().unwrap_or_default(),
            fields,
        }
    }

    fn malformed(&self, column: usize) -> LoadError {
        LoadError::MalformedField {
            line: self.line,
            tag: self.tag.to_string(),
            column,
        }
    }

    fn text(&self, column: usize) -> LoadResult<&'a str> {
        self.fields
            .get(column)
            .copied()
            .ok_or_else(|| self.malformed(column))
    }

    fn int(&self, column: usize) -> LoadResult<i64> {
        self.text(column)?
            .parse()
            .map_err(|_| self.malformed(column))
    }

    fn index(&self, column: usize) -> LoadResult<usize> {
        usize::try_from(self.int(column)?).map_err(|_| self.malformed(column))
    }

    /// Non-negative count no larger than `limit`.
    fn count(&self, column: usize, limit: usize) -> LoadResult<usize> {
        let value = self.index(column)?;
        if value > limit {
            return Err(LoadError::CountOutOfRange {
                line: self.line,
                tag: self.tag.to_string(),
                value,
                limit,
            });
        }
        Ok(value)
    }

    fn float(&self, column: usize) -> LoadResult<f32> {
        self.text(column)?
            .parse()
            .map_err(|_| self.malformed(column))
    }

    fn vec2(&self, column: usize) -> LoadResult<Vec2> {
        Ok(Vec2::new(self.float(column)?, self.float(column + 1)?))
    }

    fn missing(&self, expected: &'static str) -> LoadError {
        LoadError::MissingContext {
            line: self.line,
            tag: self.tag.to_string(),
            expected,
        }
    }
}

/// Part fields collected before the part is built.
#[derive(Default)]
struct PartDraft {
    name: String,
    source: Rect,
    corners: Option<[Vec2; 4]>,
    parent: Option<usize>,
    additive: bool,
}

impl PartDraft {
    fn build(self) -> Part {
        let mut part = Part::new(self.name, self.source).with_additive(self.additive);
        if let Some(corners) = self.corners {
            part = part.with_corners(corners);
        }
        if let Some(parent) = self.parent {
            part = part.with_parent(parent);
        }
        part
    }
}

/// Animation fields collected before the timeline is built.
struct AnimationDraft {
    section: String,
    name: String,
    looping: bool,
    root: usize,
    parts: Range<usize>,
    times: Vec<f32>,
    grid: Option<KeyGridBuilder>,
    boxes: Vec<BoundingBox>,
}

struct Loader {
    sheet: String,
    rescale: Vec2,
    declared_parts: usize,
    declared_animations: usize,
    record_limit: usize,
    parts: Vec<Option<PartDraft>>,
    animations: Vec<AnimationDraft>,

    // section state
    section: String,
    first_index: usize,
    section_opened: bool,
    part_count: usize,
    root: usize,

    // cursors into the data being built
    part: Option<usize>,
    anim_name: String,
    key: Option<usize>,
    row: Option<usize>,
    box_anim: Option<usize>,
}

impl Loader {
    fn new(
        sheet: &str,
        declared_parts: usize,
        declared_animations: usize,
        record_limit: usize,
        rescale: Vec2,
    ) -> Self {
        let mut parts = Vec::with_capacity(declared_parts);
        parts.resize_with(declared_parts, || None);
        Self {
            sheet: sheet.to_string(),
            rescale,
            declared_parts,
            declared_animations,
            record_limit,
            parts,
            animations: Vec::with_capacity(declared_animations),
            section: String::new(),
            first_index: 0,
            section_opened: false,
            part_count: 0,
            root: 0,
            part: None,
            anim_name: String::new(),
            key: None,
            row: None,
            box_anim: None,
        }
    }

    fn apply(&mut self, r: &Record<'_>) -> LoadResult<()> {
        match r.tag {
            // ---- sections and parts ----
            "SPRITESHEET_FILENAME" => {
                self.section = sheet_stem(r.text(1)?);
                self.section_opened = true;
            },
            "TOTAL_NUM_PARTS" => self.part_count = r.count(1, self.declared_parts)?,
            "ROOT_INDEX" => self.root = r.index(1)?,
            "PART_INDEX" => {
                let index = r.int(1)?;
                let p = usize::try_from(index)
                    .ok()
                    .filter(|&p| p < self.declared_parts)
                    .ok_or(LoadError::PartIndexOutOfRange {
                        line: r.line,
                        index,
                        count: self.declared_parts,
                    })?;
                if self.section_opened {
                    self.section_opened = false;
                    self.first_index = p;
                }
                self.part = Some(p);
                self.parts[p].get_or_insert_with(PartDraft::default);
            },
            "PART_NAME" => self.part_draft(r)?.name = r.text(1)?.to_string(),
            "PART_RECTANGLE" => {
                let rect = Rect::new(
                    r.int(1)? as i32,
                    r.int(2)? as i32,
                    r.int(3)? as i32,
                    r.int(4)? as i32,
                );
                self.part_draft(r)?.source = rect;
            },
            "LOCAL_POINTS_M1M2M3M4" => {
                let scale = self.rescale;
                let corners = [
                    r.vec2(1)? * scale,
                    r.vec2(3)? * scale,
                    r.vec2(5)? * scale,
                    r.vec2(7)? * scale,
                ];
                self.part_draft(r)?.corners = Some(corners);
            },
            "PART_PARENT" => {
                let parent = r.index(1)? + self.first_index;
                self.part_draft(r)?.parent = Some(parent);
            },
            "ADDITIVE" => self.part_draft(r)?.additive = true,

            // ---- animations ----
            "ANIMATION_NAME" => self.anim_name = r.text(1)?.to_string(),
            "ANIMATION_NUMBER" => {
                if self.animations.len() >= self.declared_animations {
                    return Err(LoadError::AnimationOverflow {
                        line: r.line,
                        declared: self.declared_animations,
                    });
                }
                let start = self.first_index;
                self.animations.push(AnimationDraft {
                    section: self.section.clone(),
                    name: std::mem::take(&mut self.anim_name),
                    looping: false,
                    root: self.root + start,
                    parts: start..start + self.part_count,
                    times: Vec::new(),
                    grid: None,
                    boxes: Vec::new(),
                });
                self.key = None;
                self.row = None;
            },
            "ANIMATION_KEY_COUNT" => {
                let limit = self.record_limit;
                let keys = r.count(1, limit)?;
                let anim = self.animation(r)?;
                let rows = anim.parts.len();
                // each cell of the grid needs its own PART record
                if rows.checked_mul(keys).map_or(true, |cells| cells > limit) {
                    return Err(LoadError::CountOutOfRange {
                        line: r.line,
                        tag: r.tag.to_string(),
                        value: keys,
                        limit: limit / rows.max(1),
                    });
                }
                anim.times = vec![0.0; keys];
                anim.grid = Some(KeyGridBuilder::new(rows, keys));
                self.key = None;
                self.row = None;
            },
            "LOOPING" => self.animation(r)?.looping = true,
            "KEY" => {
                let key = r.int(1)?;
                let count = self.grid(r)?.keys();
                let k = usize::try_from(key)
                    .ok()
                    .filter(|&k| k < count)
                    .ok_or(LoadError::KeyIndexOutOfRange {
                        line: r.line,
                        key,
                        count,
                    })?;
                self.key = Some(k);
                self.row = None;
            },
            "TIME" => {
                let time = r.float(1)?;
                let key = self.key.ok_or_else(|| r.missing("KEY"))?;
                let times = &mut self.animation(r)?.times;
                let count = times.len();
                let slot = times.get_mut(key).ok_or(LoadError::KeyIndexOutOfRange {
                    line: r.line,
                    key: key as i64,
                    count,
                })?;
                *slot = time;
            },
            "PART" => {
                let key = self.key.ok_or_else(|| r.missing("KEY"))?;
                let index = r.int(1)?;
                let part = usize::try_from(index)
                    .ok()
                    .map(|p| p + self.first_index)
                    .filter(|&p| p < self.declared_parts)
                    .ok_or(LoadError::PartIndexOutOfRange {
                        line: r.line,
                        index,
                        count: self.declared_parts,
                    })?;
                let row = self.row.map_or(0, |row| row + 1);
                let grid = self.grid(r)?;
                if key >= grid.keys() {
                    return Err(LoadError::KeyIndexOutOfRange {
                        line: r.line,
                        key: key as i64,
                        count: grid.keys(),
                    });
                }
                if row >= grid.rows() {
                    return Err(LoadError::KeyRowOverflow {
                        line: r.line,
                        rows: grid.rows(),
                    });
                }
                grid.set(row, key, Keyframe::for_part(part));
                self.row = Some(row);
            },
            "ORDER" => self.keyframe(r)?.order = r.index(1)?,
            "NOT_ACTIVE" => self.keyframe(r)?.active = false,
            "K_SCALE" => self.keyframe(r)?.scale = r.vec2(1)?,
            "K_ROT" => self.keyframe(r)?.rotation = r.float(1)?,
            "K_POS" => {
                let position = r.vec2(1)? * self.rescale;
                self.keyframe(r)?.position = position;
            },
            "K_ALPHA" => self.keyframe(r)?.alpha = r.float(1)?,
            "K_VERT_OFF1" | "K_VERT_OFF2" | "K_VERT_OFF3" | "K_VERT_OFF4" => {
                let corner = match r.tag {
                    "K_VERT_OFF1" => 0,
                    "K_VERT_OFF2" => 1,
                    "K_VERT_OFF3" => 2,
                    _ => 3,
                };
                let offset = r.vec2(1)? * self.rescale;
                self.keyframe(r)?.offsets[corner] = offset;
            },
            "K_RGB" => {
                let tint = Vec3::new(r.float(1)?, r.float(2)?, r.float(3)?);
                self.keyframe(r)?.tint = tint;
            },

            // ---- bounding boxes ----
            "BOX_ANIM_INDEX" => {
                if self.animations.is_empty() {
                    return Err(r.missing("ANIMATION_NUMBER"));
                }
                self.box_anim = Some(self.animations.len() - 1);
            },
            "BOX_INDEX" => self.boxes(r)?.push(BoundingBox::default()),
            "BOX_NAME" => self.bounding_box(r)?.name = r.text(1)?.to_string(),
            "BOX_TYPE" => self.bounding_box(r)?.class = BoxClass::new(r.int(1)? as i32),
            "BOX_FIRST_KEY" => self.bounding_box(r)?.first_key = r.int(1)? as i32,
            "BOX_LAST_KEY" => self.bounding_box(r)?.last_key = r.int(1)? as i32,
            "BOX_KEY_COUNT" => {
                let count = r.count(1, self.record_limit)?;
                let keys = &mut self.bounding_box(r)?.keys;
                keys.clear();
                keys.reserve(count);
            },
            "B_K_INDEX" => self.bounding_box(r)?.keys.push(BoxKey::default()),
            "B_K_FRAME" => self.box_key(r)?.frame = r.int(1)? as i32,
            "B_K_PREV_KEY" => self.box_key(r)?.prev_key = r.int(1)? as i32,
            "B_K_NEXT_KEY" => self.box_key(r)?.next_key = r.int(1)? as i32,
            "B_K_RECT" => {
                let scale = self.rescale;
                let rect = Rect::new(
                    (r.int(1)? as f32 * scale.x) as i32,
                    (r.int(2)? as f32 * scale.y) as i32,
                    (r.int(3)? as f32 * scale.x) as i32,
                    (r.int(4)? as f32 * scale.y) as i32,
                );
                self.box_key(r)?.rect = rect;
            },

            other => trace!(line = r.line, tag = other, "Ignoring record"),
        }
        Ok(())
    }

    fn part_draft(&mut self, r: &Record<'_>) -> LoadResult<&mut PartDraft> {
        self.part
            .and_then(|p| self.parts[p].as_mut())
            .ok_or_else(|| r.missing("PART_INDEX"))
    }

    fn animation(&mut self, r: &Record<'_>) -> LoadResult<&mut AnimationDraft> {
        self.animations
            .last_mut()
            .ok_or_else(|| r.missing("ANIMATION_NUMBER"))
    }

    fn grid(&mut self, r: &Record<'_>) -> LoadResult<&mut KeyGridBuilder> {
        self.animation(r)?
            .grid
            .as_mut()
            .ok_or_else(|| r.missing("ANIMATION_KEY_COUNT"))
    }

    fn keyframe(&mut self, r: &Record<'_>) -> LoadResult<&mut Keyframe> {
        let (Some(key), Some(row)) = (self.key, self.row) else {
            return Err(r.missing("PART"));
        };
        self.grid(r)?
            .get_mut(row, key)
            .ok_or_else(|| r.missing("PART"))
    }

    fn boxes(&mut self, r: &Record<'_>) -> LoadResult<&mut Vec<BoundingBox>> {
        let anim = self.box_anim.ok_or_else(|| r.missing("BOX_ANIM_INDEX"))?;
        Ok(&mut self.animations[anim].boxes)
    }

    fn bounding_box(&mut self, r: &Record<'_>) -> LoadResult<&mut BoundingBox> {
        self.boxes(r)?
            .last_mut()
            .ok_or_else(|| r.missing("BOX_INDEX"))
    }

    fn box_key(&mut self, r: &Record<'_>) -> LoadResult<&mut BoxKey> {
        self.bounding_box(r)?
            .keys
            .last_mut()
            .ok_or_else(|| r.missing("B_K_INDEX"))
    }

    fn finish(self) -> LoadResult<AnimationLibrary> {
        let mut library = AnimationLibrary::new(self.sheet);
        for (index, draft) in self.parts.into_iter().enumerate() {
            let draft = draft.ok_or(LoadError::MissingPart { index })?;
            library.add_part(draft.build());
        }

        for draft in self.animations {
            let grid = draft
                .grid
                .ok_or_else(|| LoadError::EmptyTimeline {
                    animation: draft.name.clone(),
                })?
                .build(&draft.name)?;
            let timeline = Timeline::new(draft.name, draft.times, grid, draft.parts)?
                .with_looping(draft.looping)
                .with_root(draft.root)
                .with_boxes(draft.boxes);
            library.add_timeline(&draft.section, timeline)?;
        }

        info!(
            "Loaded {} parts and {} animations for {}",
            library.parts().len(),
            library.len(),
            library.sheet_path()
        );
        Ok(library)
    }
}

/// File name without directories or extension.
fn sheet_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
