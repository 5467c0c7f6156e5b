use std::str::FromStr;

use crate::{Profile, ValidationError};

/// Profile fields editable as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    FirstName,
    LastName,
    PhoneNumber,
    ProfilePicture,
    GithubLink,
    LinkedinLink,
    Bio,
}

/// Profile fields holding a list of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Skills,
    Languages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Scalar(ScalarField),
    List(ListField),
}

impl FromStr for ProfileField {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let field = match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_name" => ProfileField::Scalar(ScalarField::FirstName),
            "last_name" => ProfileField::Scalar(ScalarField::LastName),
            "phone_number" | "phone" => ProfileField::Scalar(ScalarField::PhoneNumber),
            "profile_picture" => ProfileField::Scalar(ScalarField::ProfilePicture),
            "github_link" | "github" => ProfileField::Scalar(ScalarField::GithubLink),
            "linkedin_link" | "linkedin" => ProfileField::Scalar(ScalarField::LinkedinLink),
            "bio" => ProfileField::Scalar(ScalarField::Bio),
            "skills" => ProfileField::List(ListField::Skills),
            "languages" => ProfileField::List(ListField::Languages),
            _ => return Err(ValidationError::UnknownProfileField(raw.to_string())),
        };
        Ok(field)
    }
}

impl ListField {
    fn name(self) -> &'static str {
        match self {
            ListField::Skills => "skills",
            ListField::Languages => "languages",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEdit {
    /// Set a scalar field; an empty value clears it.
    Set { field: String, value: String },
    AddItem { field: String, item: String },
    RemoveItem { field: String, index: usize },
    ReplaceItem { field: String, index: usize, item: String },
}

/// Apply one edit to a draft profile.
pub fn apply_edit(draft: &mut Profile, edit: &ProfileEdit) -> Result<(), ValidationError> {
    match edit {
        ProfileEdit::Set { field, value } => {
            let ProfileField::Scalar(scalar) = field.parse::<ProfileField>()? else {
                return Err(ValidationError::NotAScalarField(field.clone()));
            };
            let value = value.trim();
            *scalar_slot(draft, scalar) = (!value.is_empty()).then(|| value.to_string());
        }
        ProfileEdit::AddItem { field, item } => {
            let list = list_slot(draft, field)?;
            let item = item.trim();
            if !item.is_empty() {
                list.push(item.to_string());
            }
        }
        ProfileEdit::RemoveItem { field, index } => {
            let (name, list) = named_list_slot(draft, field)?;
            if *index >= list.len() {
                return Err(ValidationError::NoSuchItem {
                    field: name.to_string(),
                    index: *index,
                });
            }
            list.remove(*index);
        }
        ProfileEdit::ReplaceItem { field, index, item } => {
            let (name, list) = named_list_slot(draft, field)?;
            let slot = list.get_mut(*index).ok_or_else(|| ValidationError::NoSuchItem {
                field: name.to_string(),
                index: *index,
            })?;
            *slot = item.trim().to_string();
        }
    }
    Ok(())
}

fn scalar_slot(draft: &mut Profile, field: ScalarField) -> &mut Option<String> {
    match field {
        ScalarField::FirstName => &mut draft.first_name,
        ScalarField::LastName => &mut draft.last_name,
        ScalarField::PhoneNumber => &mut draft.phone_number,
        ScalarField::ProfilePicture => &mut draft.profile_picture,
        ScalarField::GithubLink => &mut draft.github_link,
        ScalarField::LinkedinLink => &mut draft.linkedin_link,
        ScalarField::Bio => &mut draft.bio,
    }
}

fn list_slot<'a>(
    draft: &'a mut Profile,
    field: &str,
) -> Result<&'a mut Vec<String>, ValidationError> {
    named_list_slot(draft, field).map(|(_, list)| list)
}

fn named_list_slot<'a>(
    draft: &'a mut Profile,
    field: &str,
) -> Result<(&'static str, &'a mut Vec<String>), ValidationError> {
    match field.parse::<ProfileField>()? {
        ProfileField::List(list) => {
            let slot = match list {
                ListField::Skills => &mut draft.skills,
                ListField::Languages => &mut draft.languages,
            };
            Ok((list.name(), slot))
        }
        ProfileField::Scalar(_) => Err(ValidationError::NotAListField(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Profile {
        Profile {
            firebase_uid: "u1".to_string(),
            email: "dev@example.com".to_string(),
            skills: vec!["rust".to_string(), "sql".to_string()],
            ..Profile::default()
        }
    }

    #[test]
    fn set_scalar_trims_and_clears() {
        let mut profile = draft();
        apply_edit(
            &mut profile,
            &ProfileEdit::Set {
                field: "Bio".to_string(),
                value: "  Systems programmer ".to_string(),
            },
        )
        .unwrap();
        assert_eq!(profile.bio.as_deref(), Some("Systems programmer"));

        apply_edit(
            &mut profile,
            &ProfileEdit::Set {
                field: "bio".to_string(),
                value: "  ".to_string(),
            },
        )
        .unwrap();
        assert_eq!(profile.bio, None);
    }

    #[test]
    fn list_edits() {
        let mut profile = draft();
        apply_edit(
            &mut profile,
            &ProfileEdit::AddItem {
                field: "skills".to_string(),
                item: "tokio".to_string(),
            },
        )
        .unwrap();
        apply_edit(
            &mut profile,
            &ProfileEdit::RemoveItem {
                field: "skills".to_string(),
                index: 0,
            },
        )
        .unwrap();
        apply_edit(
            &mut profile,
            &ProfileEdit::ReplaceItem {
                field: "skills".to_string(),
                index: 0,
                item: "postgres".to_string(),
            },
        )
        .unwrap();
        assert_eq!(profile.skills, vec!["postgres".to_string(), "tokio".to_string()]);
    }

    #[test]
    fn rejects_unknown_and_mismatched_fields() {
        let mut profile = draft();
        assert_eq!(
            apply_edit(
                &mut profile,
                &ProfileEdit::Set {
                    field: "salary".to_string(),
                    value: "lots".to_string(),
                },
            ),
            Err(ValidationError::UnknownProfileField("salary".to_string()))
        );
        assert_eq!(
            apply_edit(
                &mut profile,
                &ProfileEdit::AddItem {
                    field: "bio".to_string(),
                    item: "x".to_string(),
                },
            ),
            Err(ValidationError::NotAListField("bio".to_string()))
        );
        assert_eq!(
            apply_edit(
                &mut profile,
                &ProfileEdit::RemoveItem {
                    field: "languages".to_string(),
                    index: 3,
                },
            ),
            Err(ValidationError::NoSuchItem {
                field: "languages".to_string(),
                index: 3,
            })
        );
    }
}
