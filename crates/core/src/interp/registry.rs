//! Operator dispatch table.
//!
//! Each mnemonic maps to an [`OperatorEntry`]: the operand contract the
//! interpreter checks before dispatch, and the handler that applies the
//! operator. [`OperatorRegistry::standard`] covers the PDF 1.7 content
//! operators; callers may [`register`](OperatorRegistry::register) more or
//! replace existing entries.

use super::device::PDFDevice;
use super::interpreter::ContentInterpreter;
use crate::error::{PdfError, Result};
use crate::model::objects::PDFObject;
use itertools::Itertools;
use rustc_hash::FxHashMap;

/// Expected type of a single operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Number,
    Name,
    String,
    Array,
    /// A property list: a name in the Properties resource or an inline dict.
    NameOrDict,
}

impl OperandKind {
    fn accepts(self, obj: &PDFObject) -> bool {
        match self {
            Self::Number => obj.is_number(),
            Self::Name => matches!(obj, PDFObject::Name(_)),
            Self::String => matches!(obj, PDFObject::String(_)),
            Self::Array => matches!(obj, PDFObject::Array(_)),
            Self::NameOrDict => matches!(obj, PDFObject::Name(_) | PDFObject::Dict(_)),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Name => "name",
            Self::String => "string",
            Self::Array => "array",
            Self::NameOrDict => "name or dict",
        }
    }
}

/// Operand contract of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSpec {
    /// Exactly these operands, in order.
    Exact(&'static [OperandKind]),
    /// Color components: any number of numbers, optionally followed by a
    /// pattern name when `pattern` is set. At least one operand.
    Components { pattern: bool },
}

impl OperandSpec {
    /// Check `operands` against the contract, describing the first mismatch.
    pub fn check(&self, operands: &[PDFObject]) -> std::result::Result<(), String> {
        match *self {
            Self::Exact(kinds) => {
                if operands.len() != kinds.len() {
                    return Err(format!(
                        "expected {} operand(s), got {}",
                        kinds.len(),
                        operands.len()
                    ));
                }
                for (i, (kind, obj)) in kinds.iter().zip(operands).enumerate() {
                    if !kind.accepts(obj) {
                        return Err(format!(
                            "operand {i}: expected {}, got {}",
                            kind.as_str(),
                            obj.type_name()
                        ));
                    }
                }
                Ok(())
            }
            Self::Components { pattern } => {
                let numbers = match operands.split_last() {
                    Some((PDFObject::Name(_), rest)) if pattern => rest,
                    Some(_) => operands,
                    None => return Err("expected at least one operand".into()),
                };
                match numbers.iter().find(|o| !o.is_number()) {
                    Some(bad) => Err(format!("expected number, got {}", bad.type_name())),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Applies one operator. Operands have already passed the entry's
/// [`OperandSpec`].
pub type OperatorHandler<'a, D> = fn(&mut ContentInterpreter<'a, D>, &[PDFObject]) -> Result<()>;

pub struct OperatorEntry<'a, D: PDFDevice + 'a> {
    pub operands: OperandSpec,
    pub handler: OperatorHandler<'a, D>,
}

impl<'a, D: PDFDevice + 'a> Clone for OperatorEntry<'a, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D: PDFDevice + 'a> Copy for OperatorEntry<'a, D> {}

impl<'a, D: PDFDevice + 'a> std::fmt::Debug for OperatorEntry<'a, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorEntry")
            .field("operands", &self.operands)
            .finish_non_exhaustive()
    }
}

/// Mnemonic to handler table.
pub struct OperatorRegistry<'a, D: PDFDevice + 'a> {
    entries: FxHashMap<String, OperatorEntry<'a, D>>,
}

impl<'a, D: PDFDevice + 'a> Clone for OperatorRegistry<'a, D> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<'a, D: PDFDevice + 'a> std::fmt::Debug for OperatorRegistry<'a, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.mnemonics())
            .finish()
    }
}

// ============================================================================
// Operand accessors for handlers
// ============================================================================

fn arg(args: &[PDFObject], i: usize) -> Result<&PDFObject> {
    args.get(i)
        .ok_or_else(|| PdfError::argument(format!("missing operand {i}")))
}

pub fn num(args: &[PDFObject], i: usize) -> Result<f64> {
    arg(args, i)?.as_num()
}

/// Integer operand; reals are truncated.
pub fn int(args: &[PDFObject], i: usize) -> Result<i32> {
    Ok(num(args, i)? as i32)
}

pub fn name(args: &[PDFObject], i: usize) -> Result<&str> {
    arg(args, i)?.as_name()
}

pub fn string(args: &[PDFObject], i: usize) -> Result<&[u8]> {
    arg(args, i)?.as_string()
}

pub fn array(args: &[PDFObject], i: usize) -> Result<&Vec<PDFObject>> {
    arg(args, i)?.as_array()
}

/// All operands as numbers.
pub fn numbers(args: &[PDFObject]) -> Result<Vec<f64>> {
    args.iter().map(PDFObject::as_num).collect()
}

use OperandKind::{Array, Name, NameOrDict, Number, String as Str};

const NONE: OperandSpec = OperandSpec::Exact(&[]);
const N1: OperandSpec = OperandSpec::Exact(&[Number]);
const N2: OperandSpec = OperandSpec::Exact(&[Number, Number]);
const N3: OperandSpec = OperandSpec::Exact(&[Number, Number, Number]);
const N4: OperandSpec = OperandSpec::Exact(&[Number, Number, Number, Number]);
const N6: OperandSpec =
    OperandSpec::Exact(&[Number, Number, Number, Number, Number, Number]);
const NAME: OperandSpec = OperandSpec::Exact(&[Name]);

impl<'a, D: PDFDevice + 'a> OperatorRegistry<'a, D> {
    /// Empty registry; every operator is unknown and ignored.
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Add or replace an operator.
    pub fn register(
        &mut self,
        mnemonic: impl Into<String>,
        operands: OperandSpec,
        handler: OperatorHandler<'a, D>,
    ) -> &mut Self {
        self.entries
            .insert(mnemonic.into(), OperatorEntry { operands, handler });
        self
    }

    pub fn get(&self, mnemonic: &str) -> Option<&OperatorEntry<'a, D>> {
        self.entries.get(mnemonic)
    }

    pub fn contains(&self, mnemonic: &str) -> bool {
        self.entries.contains_key(mnemonic)
    }

    pub fn remove(&mut self, mnemonic: &str) -> Option<OperatorEntry<'a, D>> {
        self.entries.remove(mnemonic)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Registered mnemonics, sorted.
    pub fn mnemonics(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).sorted_unstable().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The PDF 1.7 content stream operators.
    pub fn standard() -> Self {
        let mut r = Self::new();

        // Graphics state
        r.register("q", NONE, |it, _| {
            it.do_q();
            Ok(())
        });
        r.register("Q", NONE, |it, _| {
            it.do_Q();
            Ok(())
        });
        r.register("cm", N6, |it, a| {
            it.do_cm((num(a, 0)?, num(a, 1)?, num(a, 2)?, num(a, 3)?, num(a, 4)?, num(a, 5)?));
            Ok(())
        });
        r.register("w", N1, |it, a| {
            it.do_w(num(a, 0)?);
            Ok(())
        });
        r.register("J", N1, |it, a| it.do_J(int(a, 0)?));
        r.register("j", N1, |it, a| it.do_j(int(a, 0)?));
        r.register("M", N1, |it, a| {
            it.do_M(num(a, 0)?);
            Ok(())
        });
        r.register("d", OperandSpec::Exact(&[Array, Number]), |it, a| {
            it.do_d(array(a, 0)?, num(a, 1)?)
        });
        r.register("ri", NAME, |it, a| {
            it.do_ri(name(a, 0)?);
            Ok(())
        });
        r.register("i", N1, |it, a| {
            it.do_i(num(a, 0)?);
            Ok(())
        });
        r.register("gs", NAME, |it, a| it.do_gs(name(a, 0)?));

        // Path construction
        r.register("m", N2, |it, a| {
            it.do_m(num(a, 0)?, num(a, 1)?);
            Ok(())
        });
        r.register("l", N2, |it, a| {
            it.do_l(num(a, 0)?, num(a, 1)?);
            Ok(())
        });
        r.register("c", N6, |it, a| {
            it.do_c(num(a, 0)?, num(a, 1)?, num(a, 2)?, num(a, 3)?, num(a, 4)?, num(a, 5)?);
            Ok(())
        });
        r.register("v", N4, |it, a| {
            it.do_v(num(a, 0)?, num(a, 1)?, num(a, 2)?, num(a, 3)?);
            Ok(())
        });
        r.register("y", N4, |it, a| {
            it.do_y(num(a, 0)?, num(a, 1)?, num(a, 2)?, num(a, 3)?);
            Ok(())
        });
        r.register("h", NONE, |it, _| {
            it.do_h();
            Ok(())
        });
        r.register("re", N4, |it, a| {
            it.do_re(num(a, 0)?, num(a, 1)?, num(a, 2)?, num(a, 3)?);
            Ok(())
        });

        // Path painting and clipping
        let painting: [(&str, OperatorHandler<'a, D>); 12] = [
            ("S", |it, _| {
                it.do_S();
                Ok(())
            }),
            ("s", |it, _| {
                it.do_s();
                Ok(())
            }),
            ("f", |it, _| {
                it.do_f();
                Ok(())
            }),
            ("F", |it, _| {
                it.do_f();
                Ok(())
            }),
            ("f*", |it, _| {
                it.do_f_star();
                Ok(())
            }),
            ("B", |it, _| {
                it.do_B();
                Ok(())
            }),
            ("B*", |it, _| {
                it.do_B_star();
                Ok(())
            }),
            ("b", |it, _| {
                it.do_b();
                Ok(())
            }),
            ("b*", |it, _| {
                it.do_b_star();
                Ok(())
            }),
            ("n", |it, _| {
                it.do_n();
                Ok(())
            }),
            ("W", |it, _| {
                it.do_W();
                Ok(())
            }),
            ("W*", |it, _| {
                it.do_W_star();
                Ok(())
            }),
        ];
        for (op, handler) in painting {
            r.register(op, NONE, handler);
        }

        // Text objects, state and positioning
        r.register("BT", NONE, |it, _| it.do_BT());
        r.register("ET", NONE, |it, _| it.do_ET());
        r.register("Tc", N1, |it, a| {
            it.do_Tc(num(a, 0)?);
            Ok(())
        });
        r.register("Tw", N1, |it, a| {
            it.do_Tw(num(a, 0)?);
            Ok(())
        });
        r.register("Tz", N1, |it, a| {
            it.do_Tz(num(a, 0)?);
            Ok(())
        });
        r.register("TL", N1, |it, a| {
            it.do_TL(num(a, 0)?);
            Ok(())
        });
        r.register("Tf", OperandSpec::Exact(&[Name, Number]), |it, a| {
            it.do_Tf(name(a, 0)?, num(a, 1)?);
            Ok(())
        });
        r.register("Tr", N1, |it, a| {
            it.do_Tr(int(a, 0)?);
            Ok(())
        });
        r.register("Ts", N1, |it, a| {
            it.do_Ts(num(a, 0)?);
            Ok(())
        });
        r.register("Td", N2, |it, a| it.do_Td(num(a, 0)?, num(a, 1)?));
        r.register("TD", N2, |it, a| it.do_TD(num(a, 0)?, num(a, 1)?));
        r.register("Tm", N6, |it, a| {
            it.do_Tm((num(a, 0)?, num(a, 1)?, num(a, 2)?, num(a, 3)?, num(a, 4)?, num(a, 5)?))
        });
        r.register("T*", NONE, |it, _| it.do_T_star());

        // Text showing
        r.register("Tj", OperandSpec::Exact(&[Str]), |it, a| it.do_Tj(string(a, 0)?));
        r.register("TJ", OperandSpec::Exact(&[Array]), |it, a| it.do_TJ(array(a, 0)?));
        r.register("'", OperandSpec::Exact(&[Str]), |it, a| it.do_quote(string(a, 0)?));
        r.register("\"", OperandSpec::Exact(&[Number, Number, Str]), |it, a| {
            it.do_doublequote(num(a, 0)?, num(a, 1)?, string(a, 2)?)
        });

        // Type 3 glyph metrics
        r.register("d0", N2, |_, _| Ok(()));
        r.register("d1", N6, |_, _| Ok(()));

        // Color
        r.register("CS", NAME, |it, a| it.do_CS(name(a, 0)?));
        r.register("cs", NAME, |it, a| it.do_cs(name(a, 0)?));
        r.register("SC", OperandSpec::Components { pattern: false }, |it, a| {
            it.do_SC(a)
        });
        r.register("SCN", OperandSpec::Components { pattern: true }, |it, a| {
            it.do_SC(a)
        });
        r.register("sc", OperandSpec::Components { pattern: false }, |it, a| {
            it.do_sc(a)
        });
        r.register("scn", OperandSpec::Components { pattern: true }, |it, a| {
            it.do_sc(a)
        });
        r.register("G", N1, |it, a| {
            it.do_G(num(a, 0)?);
            Ok(())
        });
        r.register("g", N1, |it, a| {
            it.do_g(num(a, 0)?);
            Ok(())
        });
        r.register("RG", N3, |it, a| {
            it.do_RG(num(a, 0)?, num(a, 1)?, num(a, 2)?);
            Ok(())
        });
        r.register("rg", N3, |it, a| {
            it.do_rg(num(a, 0)?, num(a, 1)?, num(a, 2)?);
            Ok(())
        });
        r.register("K", N4, |it, a| {
            it.do_K(num(a, 0)?, num(a, 1)?, num(a, 2)?, num(a, 3)?);
            Ok(())
        });
        r.register("k", N4, |it, a| {
            it.do_k(num(a, 0)?, num(a, 1)?, num(a, 2)?, num(a, 3)?);
            Ok(())
        });

        // XObjects and shadings
        r.register("sh", NAME, |it, a| it.do_sh(name(a, 0)?));
        r.register("Do", NAME, |it, a| it.do_Do(name(a, 0)?));

        // Marked content and compatibility sections
        r.register("MP", NAME, |it, a| {
            it.do_MP(name(a, 0)?);
            Ok(())
        });
        r.register("DP", OperandSpec::Exact(&[Name, NameOrDict]), |it, a| {
            it.do_DP(name(a, 0)?, arg(a, 1)?);
            Ok(())
        });
        r.register("BMC", NAME, |it, a| {
            it.do_BMC(name(a, 0)?);
            Ok(())
        });
        r.register("BDC", OperandSpec::Exact(&[Name, NameOrDict]), |it, a| {
            it.do_BDC(name(a, 0)?, arg(a, 1)?);
            Ok(())
        });
        r.register("EMC", NONE, |it, _| {
            it.do_EMC();
            Ok(())
        });
        r.register("BX", NONE, |it, _| {
            it.do_BX();
            Ok(())
        });
        r.register("EX", NONE, |it, _| {
            it.do_EX();
            Ok(())
        });

        r
    }
}

impl<'a, D: PDFDevice + 'a> Default for OperatorRegistry<'a, D> {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::device::NullDevice;

    #[test]
    fn exact_spec_checks_count_and_types() {
        let spec = OperandSpec::Exact(&[Name, Number]);
        assert!(spec
            .check(&[PDFObject::name("F1"), PDFObject::Int(12)])
            .is_ok());
        assert!(spec.check(&[PDFObject::name("F1")]).is_err());
        let err = spec
            .check(&[PDFObject::Int(1), PDFObject::Int(12)])
            .unwrap_err();
        assert_eq!(err, "operand 0: expected name, got int");
    }

    #[test]
    fn component_spec_allows_trailing_pattern_name() {
        let scn = OperandSpec::Components { pattern: true };
        let sc = OperandSpec::Components { pattern: false };
        let args = [PDFObject::Real(0.5), PDFObject::name("P1")];
        assert!(scn.check(&args).is_ok());
        assert!(sc.check(&args).is_err());
        assert!(scn.check(&[PDFObject::name("P1")]).is_ok());
        assert!(sc.check(&[]).is_err());
    }

    #[test]
    fn standard_table_is_complete() {
        let registry: OperatorRegistry<'_, NullDevice> = OperatorRegistry::standard();
        for op in [
            "w", "J", "j", "M", "d", "ri", "i", "gs", "q", "Q", "cm", "m", "l", "c", "v", "y",
            "h", "re", "S", "s", "f", "F", "f*", "B", "B*", "b", "b*", "n", "W", "W*", "BT",
            "ET", "Tc", "Tw", "Tz", "TL", "Tf", "Tr", "Ts", "Td", "TD", "Tm", "T*", "Tj", "TJ",
            "'", "\"", "d0", "d1", "CS", "cs", "SC", "SCN", "sc", "scn", "G", "g", "RG", "rg",
            "K", "k", "sh", "Do", "MP", "DP", "BMC", "BDC", "EMC", "BX", "EX",
        ] {
            assert!(registry.contains(op), "missing {op}");
        }
        assert_eq!(registry.len(), 70);
    }
}
