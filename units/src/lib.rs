//! Pithy construction and extraction of the `uom` quantities used throughout
//! the workspace.
//!
//! Making quantities from float literals is long-winded in plain `uom`
//! (`Length::new::<millimeter>(x)`), so this crate provides one-word
//! constructors (`mm`, `cm`, `ns`, ...) and matching extractors with a
//! trailing underscore (`mm_`, `cm_`, `ns_`, ...).

pub use uom;

pub mod todo;

pub use uom::si::f32::{Length, Ratio, Time};

use uom::si::length::{centimeter, millimeter};
use uom::si::ratio::ratio as uom_ratio;
use uom::si::time::{microsecond, nanosecond};

pub fn mm(x: f32) -> Length { Length::new::<millimeter>(x) }
pub fn cm(x: f32) -> Length { Length::new::<centimeter>(x) }
pub fn ns(x: f32) -> Time   {   Time::new::<nanosecond>(x) }
pub fn us(x: f32) -> Time   {   Time::new::<microsecond>(x) }
pub fn ratio(x: f32) -> Ratio { Ratio::new::<uom_ratio>(x) }

pub fn mm_(x: Length) -> f32 { x.get::<millimeter>() }
pub fn cm_(x: Length) -> f32 { x.get::<centimeter>() }
pub fn ns_(x: Time)   -> f32 { x.get::<nanosecond>() }
pub fn us_(x: Time)   -> f32 { x.get::<microsecond>() }
pub fn ratio_(x: Ratio) -> f32 { x.get::<uom_ratio>() }
