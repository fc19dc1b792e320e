//! # Skills
//!
//! Skills are the human-readable gateway to progressively disclosed
//! capabilities: always-visible `skill://` resources whose bodies document
//! tools and resources that may themselves be hidden from listings. Manual
//! skills carry authored markdown; generated skills are synthesized from the
//! live registry on every read.

pub mod renderer;
pub mod skill;

pub use renderer::{render, RenderWarning, RenderedSkill};
pub use skill::{
    skill_uri, Skill, SkillContent, SkillDecl, SkillError, SkillProvider, SKILL_MIME_TYPE,
    SKILL_URI_SCHEME,
};
