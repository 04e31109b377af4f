use crate::domain::{
    entities::{phase::PhasePlan, session::TransformSession},
    error::DomainError,
};

/// Centralized domain validation.
///
/// Pipeline configuration is checked once, before any file is touched.
pub struct DomainValidator;

impl DomainValidator {
    /// Phase ids are unique and every phase has transforms with valid metadata.
    pub fn validate_phases(phases: &[PhasePlan]) -> Result<(), DomainError> {
        for (i, plan) in phases.iter().enumerate() {
            if phases[..i].iter().any(|p| p.phase.id == plan.phase.id) {
                return Err(DomainError::DuplicatePhase {
                    id: plan.phase.id.clone(),
                });
            }
            if plan.transforms.is_empty() {
                return Err(DomainError::EmptyPhase {
                    id: plan.phase.id.clone(),
                });
            }
            for transform in &plan.transforms {
                transform.meta().validate()?;
            }
        }
        Ok(())
    }

    /// Every selected id names a configured phase.
    pub fn validate_selection(phases: &[PhasePlan], selected: &[String]) -> Result<(), DomainError> {
        match selected
            .iter()
            .find(|id| !phases.iter().any(|p| &p.phase.id == *id))
        {
            Some(id) => Err(DomainError::UnknownPhase { id: id.clone() }),
            None => Ok(()),
        }
    }

    pub fn validate_sealed(session: &TransformSession) -> Result<(), DomainError> {
        if session.is_sealed() {
            Ok(())
        } else {
            Err(DomainError::SessionNotSealed {
                session_id: session.session_id.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::phase::PipelinePhase,
        review::ManualReviewTransform,
        value_objects::TransformKind,
    };

    fn plan(id: &str) -> PhasePlan {
        PhasePlan::single(
            PipelinePhase::new(id, TransformKind::Manual),
            ManualReviewTransform::new().unwrap(),
        )
    }

    #[test]
    fn duplicate_phase_ids_are_rejected() {
        let phases = vec![plan("a"), plan("b"), plan("a")];
        assert_eq!(
            DomainValidator::validate_phases(&phases),
            Err(DomainError::DuplicatePhase { id: "a".into() })
        );
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let phases = vec![plan("a")];
        assert!(DomainValidator::validate_selection(&phases, &["a".into()]).is_ok());
        assert_eq!(
            DomainValidator::validate_selection(&phases, &["zzz".into()]),
            Err(DomainError::UnknownPhase { id: "zzz".into() })
        );
    }
}
