use pilesim_core::{BodyId, Scalar};
use crate::{BodyAccess, ControlError, ControlResult};

/// Pile facets split by their initial height: the highest ones form the top, the lowest the
/// bottom, everything in between the lateral surface. Membership never changes afterwards.
#[derive(Clone, Debug)]
pub struct PileBodySet {
    ids: Vec<BodyId>,
    top: Vec<BodyId>,
    bottom: Vec<BodyId>,
    lateral: Vec<BodyId>,
    reference: BodyId,
    top_y: Scalar,
    bottom_y: Scalar,
}

impl PileBodySet {
    pub fn partition(entries: &[(BodyId, Scalar)]) -> ControlResult<Self> {
        if entries.is_empty() { return Err(ControlError::EmptyPile); }
        if let Some(&(id, _)) = entries.iter().find(|e| !e.1.is_finite()) {
            return Err(ControlError::NonFinitePosition(id));
        }
        let top_y = entries.iter().map(|e| e.1).fold(Scalar::NEG_INFINITY, Scalar::max);
        let bottom_y = entries.iter().map(|e| e.1).fold(Scalar::INFINITY, Scalar::min);

        let (mut top, mut bottom, mut lateral) = (Vec::new(), Vec::new(), Vec::new());
        for &(id, y) in entries {
            if y == top_y { top.push(id); }
            else if y == bottom_y { bottom.push(id); }
            else { lateral.push(id); }
        }
        // a flat pile puts everything on top; its bottom is the same set
        if bottom.is_empty() { bottom = top.clone(); }
        let reference = *bottom.first().ok_or(ControlError::EmptyPile)?;

        Ok(Self { ids: entries.iter().map(|e| e.0).collect(), top, bottom, lateral, reference, top_y, bottom_y })
    }

    /// Partition using the current positions held by the engine.
    pub fn from_positions<A: BodyAccess + ?Sized>(access: &A, ids: &[BodyId]) -> ControlResult<Self> {
        let entries = ids.iter()
            .map(|&id| access.position(id).map(|p| (id, p.y)).ok_or(ControlError::UnknownBody(id)))
            .collect::<ControlResult<Vec<_>>>()?;
        Self::partition(&entries)
    }

    #[inline] pub fn ids(&self) -> &[BodyId] { &self.ids }
    #[inline] pub fn top(&self) -> &[BodyId] { &self.top }
    #[inline] pub fn bottom(&self) -> &[BodyId] { &self.bottom }
    #[inline] pub fn lateral(&self) -> &[BodyId] { &self.lateral }
    #[inline] pub fn len(&self) -> usize { self.ids.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// The first bottom facet stands for the pile tip.
    #[inline] pub fn reference(&self) -> BodyId { self.reference }

    /// Height measured between top and bottom facets at partition time.
    #[inline] pub fn height(&self) -> Scalar { self.top_y - self.bottom_y }
    #[inline] pub fn initial_extent(&self) -> (Scalar, Scalar) { (self.bottom_y, self.top_y) }

    /// Current vertical position of the pile tip.
    pub fn bottom_y<A: BodyAccess + ?Sized>(&self, access: &A) -> ControlResult<Scalar> {
        let id = self.reference();
        access.position(id).map(|p| p.y).ok_or(ControlError::UnknownBody(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn splits_by_height() {
        let entries = [
            (BodyId(10), 1.0), (BodyId(11), 1.3), (BodyId(12), 1.1),
            (BodyId(13), 1.0), (BodyId(14), 1.3), (BodyId(15), 1.2),
        ];
        let p = PileBodySet::partition(&entries).unwrap();
        assert_eq!(p.top(), &[BodyId(11), BodyId(14)]);
        assert_eq!(p.bottom(), &[BodyId(10), BodyId(13)]);
        assert_eq!(p.lateral(), &[BodyId(12), BodyId(15)]);
        assert_eq!(p.reference(), BodyId(10));
        assert_eq!(p.len(), 6);
        assert_relative_eq!(p.height(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn empty_pile_rejected() {
        assert!(matches!(PileBodySet::partition(&[]), Err(ControlError::EmptyPile)));
    }

    #[test]
    fn flat_pile_has_a_bottom() {
        let p = PileBodySet::partition(&[(BodyId(1), 0.5), (BodyId(2), 0.5)]).unwrap();
        assert_eq!(p.reference(), BodyId(1));
        assert_eq!(p.height(), 0.0);
    }

    #[test]
    fn non_finite_heights_rejected() {
        let nan = PileBodySet::partition(&[(BodyId(1), Scalar::NAN), (BodyId(2), Scalar::NAN)]);
        assert!(matches!(nan, Err(ControlError::NonFinitePosition(BodyId(1)))));
        let inf = PileBodySet::partition(&[(BodyId(1), 0.5), (BodyId(2), Scalar::INFINITY)]);
        assert!(matches!(inf, Err(ControlError::NonFinitePosition(BodyId(2)))));
    }
}
