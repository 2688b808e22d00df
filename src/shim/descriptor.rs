//! JVM type and member descriptors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed descriptor `{descriptor}`")]
pub struct DescriptorError {
    pub descriptor: String,
}

fn malformed(descriptor: &str) -> DescriptorError {
    DescriptorError {
        descriptor: descriptor.to_string(),
    }
}

/// A parsed method descriptor. Types are kept in descriptor form (`I`,
/// `Lfoo/Bar;`, `[D`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<String>,
    pub ret: String,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let rest = descriptor
            .strip_prefix('(')
            .ok_or_else(|| malformed(descriptor))?;
        let (params_part, ret) = rest.split_once(')').ok_or_else(|| malformed(descriptor))?;

        let mut params = Vec::new();
        let mut remaining = params_part;
        while !remaining.is_empty() {
            let len = field_type_len(remaining).ok_or_else(|| malformed(descriptor))?;
            params.push(remaining[..len].to_string());
            remaining = &remaining[len..];
        }

        if ret != "V" && field_type_len(ret) != Some(ret.len()) {
            return Err(malformed(descriptor));
        }

        Ok(MethodDescriptor {
            params,
            ret: ret.to_string(),
        })
    }
}

/// Length of the leading field type in `s`, if well formed.
fn field_type_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut dims = 0;
    while bytes.get(dims) == Some(&b'[') {
        dims += 1;
    }
    match bytes.get(dims)? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => Some(dims + 1),
        b'L' => {
            let end = s[dims..].find(';')?;
            if end <= 1 {
                return None;
            }
            Some(dims + end + 1)
        }
        _ => None,
    }
}

/// Number of local variable slots a value of this type occupies.
pub fn slot_size(ty: &str) -> u16 {
    match ty {
        "J" | "D" => 2,
        _ => 1,
    }
}

/// A reference to a method, written `Lowner;name(args)ret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl MemberRef {
    pub fn parse(reference: &str) -> Result<Self, DescriptorError> {
        let rest = reference
            .strip_prefix('L')
            .ok_or_else(|| malformed(reference))?;
        let (owner, rest) = rest.split_once(';').ok_or_else(|| malformed(reference))?;
        let paren = rest.find('(').ok_or_else(|| malformed(reference))?;
        let (name, descriptor) = rest.split_at(paren);

        if owner.is_empty() || name.is_empty() {
            return Err(malformed(reference));
        }
        MethodDescriptor::parse(descriptor).map_err(|_| malformed(reference))?;

        Ok(MemberRef {
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    pub fn matches(&self, owner: &str, name: &str, descriptor: &str) -> bool {
        self.owner == owner && self.name == name && self.descriptor == descriptor
    }
}

/// A method selector: either a bare name or `name(args)ret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSelector {
    pub name: String,
    pub descriptor: Option<String>,
}

impl MethodSelector {
    pub fn parse(selector: &str) -> Result<Self, DescriptorError> {
        match selector.find('(') {
            None if !selector.is_empty() => Ok(MethodSelector {
                name: selector.to_string(),
                descriptor: None,
            }),
            Some(paren) if paren > 0 => {
                let (name, descriptor) = selector.split_at(paren);
                MethodDescriptor::parse(descriptor).map_err(|_| malformed(selector))?;
                Ok(MethodSelector {
                    name: name.to_string(),
                    descriptor: Some(descriptor.to_string()),
                })
            }
            _ => Err(malformed(selector)),
        }
    }

    pub fn matches(&self, name: &str, descriptor: &str) -> bool {
        self.name == name && self.descriptor.as_deref().map_or(true, |d| d == descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_descriptor() {
        let desc = MethodDescriptor::parse("(FLnet/minecraft/Camera;[[IJ)V").unwrap();
        assert_eq!(desc.params, vec!["F", "Lnet/minecraft/Camera;", "[[I", "J"]);
        assert_eq!(desc.ret, "V");

        let desc = MethodDescriptor::parse("()Ljava/lang/String;").unwrap();
        assert!(desc.params.is_empty());
        assert_eq!(desc.ret, "Ljava/lang/String;");
    }

    #[test]
    fn test_malformed_method_descriptors() {
        for bad in ["", "V", "(", "(Q)V", "(L;)V", "(I)", "(I)VV", "(Lfoo)V"] {
            assert!(MethodDescriptor::parse(bad).is_err(), "{} parsed", bad);
        }
    }

    #[test]
    fn test_member_ref() {
        let r = MemberRef::parse("Lcom/mojang/blaze3d/systems/RenderSystem;setShaderFogStart(F)V")
            .unwrap();
        assert_eq!(r.owner, "com/mojang/blaze3d/systems/RenderSystem");
        assert_eq!(r.name, "setShaderFogStart");
        assert_eq!(r.descriptor, "(F)V");

        assert!(MemberRef::parse("RenderSystem.setShaderFogStart(F)V").is_err());
        assert!(MemberRef::parse("Lfoo;(F)V").is_err());
    }

    #[test]
    fn test_method_selector() {
        let bare = MethodSelector::parse("setupFog").unwrap();
        assert!(bare.matches("setupFog", "(FZ)V"));
        assert!(!bare.matches("render", "(FZ)V"));

        let exact = MethodSelector::parse("setupFog(FZ)V").unwrap();
        assert!(exact.matches("setupFog", "(FZ)V"));
        assert!(!exact.matches("setupFog", "(F)V"));
    }

    #[test]
    fn test_slot_size() {
        assert_eq!(slot_size("D"), 2);
        assert_eq!(slot_size("J"), 2);
        assert_eq!(slot_size("Lfoo;"), 1);
    }
}
