//! MIB name resolution and varbind enrichment.
//!
//! No analog in `lukeod-async-snmp`, whose `mib` feature shells out to the
//! separate `mib-rs` crate for full MIB compilation. This is a much smaller
//! thing: a built-in table of the handful of MIB-II names any SNMP tool
//! needs without external MIB files, plus a formatter that turns a decoded
//! [`VarBind`] into something a human (or a JSON consumer) can read without
//! cross-referencing an OID by hand.
//!
//! Anything not in the table falls back to its numeric OID, so enrichment
//! never fails - it can only be more or less helpful.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

/// `iso.org.dod.internet.mgmt.mib-2` - `1.3.6.1.2.1`, the root most
/// built-in names hang off of.
const MIB_2: &[u32] = &[1, 3, 6, 1, 2, 1];

/// Names wired in at construction time, as `(suffix under MIB_2, name)`.
///
/// Covers the `system` and `interfaces`/`ifTable` groups, which is what
/// practically every SNMP walk touches first.
const BUILTIN_NAMES: &[(&[u32], &str)] = &[
    (&[1, 1, 0], "sysDescr.0"),
    (&[1, 2, 0], "sysObjectID.0"),
    (&[1, 3, 0], "sysUpTime.0"),
    (&[1, 4, 0], "sysContact.0"),
    (&[1, 5, 0], "sysName.0"),
    (&[1, 6, 0], "sysLocation.0"),
    (&[1, 7, 0], "sysServices.0"),
    (&[2, 1, 0], "ifNumber.0"),
    (&[2, 2, 1, 1], "ifIndex"),
    (&[2, 2, 1, 2], "ifDescr"),
    (&[2, 2, 1, 3], "ifType"),
    (&[2, 2, 1, 4], "ifMtu"),
    (&[2, 2, 1, 5], "ifSpeed"),
    (&[2, 2, 1, 6], "ifPhysAddress"),
    (&[2, 2, 1, 7], "ifAdminStatus"),
    (&[2, 2, 1, 8], "ifOperStatus"),
    (&[2, 2, 1, 9], "ifLastChange"),
    (&[2, 2, 1, 10], "ifInOctets"),
    (&[2, 2, 1, 11], "ifInUcastPkts"),
    (&[2, 2, 1, 13], "ifInDiscards"),
    (&[2, 2, 1, 14], "ifInErrors"),
    (&[2, 2, 1, 16], "ifOutOctets"),
    (&[2, 2, 1, 17], "ifOutUcastPkts"),
    (&[2, 2, 1, 19], "ifOutDiscards"),
    (&[2, 2, 1, 20], "ifOutErrors"),
];

/// `ifTable`/`ifEntry` themselves (not individual columns), so walking
/// `1.3.6.1.2.1.2.2` by root still resolves sensibly.
const BUILTIN_SUBTREES: &[(&[u32], &str)] = &[(&[2, 2], "ifTable"), (&[2, 2, 1], "ifEntry")];

/// A name table mapping OIDs to MIB-II style names.
///
/// Built with [`Registry::builtin`] (the default) or grown with
/// [`Registry::register`] for application-specific additions. Lookups that
/// don't match any entry exactly fall back to the nearest registered
/// ancestor plus the remaining arcs as an instance suffix (e.g.
/// `ifDescr.1` for `1.3.6.1.2.1.2.2.1.2.1` when only `ifDescr` itself is
/// registered), and failing that, to the OID's numeric string.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    names: HashMap<Vec<u32>, String>,
}

impl Registry {
    /// An empty registry with no names.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the `system` and `interfaces` MIB-II
    /// names.
    pub fn builtin() -> Self {
        let mut names = HashMap::with_capacity(BUILTIN_NAMES.len() + BUILTIN_SUBTREES.len());
        for (suffix, name) in BUILTIN_NAMES {
            names.insert(full_oid(suffix), (*name).to_string());
        }
        for (suffix, name) in BUILTIN_SUBTREES {
            names.insert(full_oid(suffix), (*name).to_string());
        }
        Self { names }
    }

    /// Register (or override) a name for an exact OID.
    pub fn register(&mut self, oid: Oid, name: impl Into<String>) {
        self.names.insert(oid.as_slice().to_vec(), name.into());
    }

    /// Resolve `oid` to a name, falling back to the nearest registered
    /// ancestor with the remaining arcs appended as an instance suffix.
    /// Returns `None` only when no registered OID is an ancestor of `oid`.
    pub fn name_for(&self, oid: &Oid) -> Option<String> {
        let arcs = oid.as_slice();
        if let Some(name) = self.names.get(arcs) {
            return Some(name.clone());
        }

        let mut best: Option<(usize, &str)> = None;
        for (prefix, name) in &self.names {
            if prefix.len() < arcs.len() && arcs.starts_with(prefix.as_slice()) {
                if best.is_none_or(|(len, _)| prefix.len() > len) {
                    best = Some((prefix.len(), name.as_str()));
                }
            }
        }

        best.map(|(prefix_len, name)| {
            let mut out = name.to_string();
            for arc in &arcs[prefix_len..] {
                let _ = write!(out, ".{arc}");
            }
            out
        })
    }
}

fn full_oid(suffix: &[u32]) -> Vec<u32> {
    let mut arcs = MIB_2.to_vec();
    arcs.extend_from_slice(suffix);
    arcs
}

/// Options controlling what [`enrich`] fills in.
#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    /// Resolve [`EnrichedVarBind::name`] from the registry (default: on).
    pub include_names: bool,
    /// Fill [`EnrichedVarBind::formatted`] with a human-readable rendering
    /// of the value (default: on).
    pub include_formatted: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            include_names: true,
            include_formatted: true,
        }
    }
}

/// A [`VarBind`] annotated with a resolved name, string OID forms, and an
/// optional human-readable rendering of its value.
///
/// Produced by [`enrich`]; applying `enrich` twice to the same varbind with
/// the same options and registry yields an identical `EnrichedVarBind`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedVarBind {
    /// Registry-resolved name, if [`EnrichOptions::include_names`] was set
    /// and the registry had an ancestor match.
    pub name: Option<String>,
    /// The OID in dotted-decimal form.
    pub oid: String,
    /// The OID's arcs, for callers that want to avoid re-parsing `oid`.
    pub oid_list: Vec<u32>,
    /// [`Value::type_name`] of the underlying value.
    pub r#type: &'static str,
    /// The decoded value, unchanged.
    pub value: Value,
    /// Human-readable rendering of `value`, if
    /// [`EnrichOptions::include_formatted`] was set.
    pub formatted: Option<String>,
}

/// Enrich a single varbind against `registry` using `options`.
pub fn enrich(varbind: &VarBind, registry: &Registry, options: EnrichOptions) -> EnrichedVarBind {
    let name = options.include_names.then(|| registry.name_for(&varbind.oid)).flatten();
    let formatted = options
        .include_formatted
        .then(|| format_value(&varbind.value, registry));

    EnrichedVarBind {
        name,
        oid: varbind.oid.to_string(),
        oid_list: varbind.oid.as_slice().to_vec(),
        r#type: varbind.value.type_name(),
        value: varbind.value.clone(),
        formatted,
    }
}

/// Enrich a batch of varbinds, e.g. a `get_many`/walk result, against
/// `registry` using `options`.
pub fn enrich_all(
    varbinds: &[VarBind],
    registry: &Registry,
    options: EnrichOptions,
) -> Vec<EnrichedVarBind> {
    varbinds.iter().map(|vb| enrich(vb, registry, options)).collect()
}

/// Render `value` the way a human would expect to read it: ASCII octet
/// strings as text, binary ones as hex, `TimeTicks` as `D+HH:MM:SS.ss`,
/// object identifiers resolved through `registry`, everything else via
/// [`Value`]'s `Display`.
fn format_value(value: &Value, registry: &Registry) -> String {
    match value {
        Value::OctetString(bytes) => {
            if bytes.iter().all(|&b| (0x20..0x7f).contains(&b)) {
                String::from_utf8_lossy(bytes).into_owned()
            } else {
                format!("0x{}", crate::util::encode_hex(bytes))
            }
        }
        Value::TimeTicks(ticks) => format_timeticks(*ticks),
        Value::ObjectIdentifier(oid) => registry.name_for(oid).unwrap_or_else(|| oid.to_string()),
        other => other.to_string(),
    }
}

/// `TimeTicks` are hundredths of a second; render as `days+HH:MM:SS.hh`.
fn format_timeticks(ticks: u32) -> String {
    let hundredths = ticks % 100;
    let total_seconds = ticks / 100;
    let seconds = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let minutes = total_minutes % 60;
    let total_hours = total_minutes / 60;
    let hours = total_hours % 24;
    let days = total_hours / 24;
    format!("{days}:{hours:02}:{minutes:02}:{seconds:02}.{hundredths:02}")
}
