//! Material dispatcher.
//!
//! Selects the constitutive model of a material once, then evaluates
//! it at every point of that material and writes back stress, tangent
//! moduli, stored energy and the plastic state.

use otm_exec::ExecutionBackend;
use otm_material::{ConstitutiveModel, ConstitutiveResponse, MaterialSet, PlasticState};
use otm_types::{MaterialId, OtmError, OtmResult, PointId};
use tracing::{debug, warn};

use crate::state::SimulationState;

/// Updates every point of `material` for time increment `dt`.
///
/// Fails with `InvalidMaterial` for an unknown id. If the model rejects
/// any point (inverted deformation), nothing is written and the lowest
/// failing point is reported as `NonPositiveJacobian`.
pub fn update_material_state<B>(
    state: &mut SimulationState,
    materials: &MaterialSet,
    material: MaterialId,
    dt: f64,
    backend: &B,
) -> OtmResult<()>
where
    B: ExecutionBackend + ?Sized,
{
    state.check_sizes()?;
    let model = materials.require(material)?;
    let points = &state.points;

    let results = backend.map(points.len(), |p| {
        if points.material[p] != material {
            return None;
        }
        let mut plastic = PlasticState {
            deformation_gradient: points.plastic_deformation_gradient[p],
            equivalent_strain: points.equivalent_plastic_strain[p],
        };
        Some(
            model
                .update(&points.deformation_gradient[p], dt, &mut plastic)
                .map(|response| (response, plastic)),
        )
    });

    let failures = results.iter().flatten().filter(|r| r.is_err()).count();
    if let Some((p, failure)) = results
        .iter()
        .enumerate()
        .find_map(|(p, r)| match r {
            Some(Err(failure)) => Some((p, *failure)),
            _ => None,
        })
    {
        warn!(
            failures,
            material = material.0,
            model = model.name(),
            "constitutive update rejected"
        );
        return Err(OtmError::NonPositiveJacobian {
            point: PointId(p as u32),
            jacobian: failure.jacobian,
        });
    }

    let points = &mut state.points;
    let mut updated = 0usize;
    for (p, result) in results.into_iter().enumerate() {
        let Some(Ok((response, plastic))) = result else {
            continue;
        };
        let ConstitutiveResponse {
            stress,
            bulk_modulus,
            shear_modulus,
            energy_density,
        } = response;
        points.stress[p] = stress;
        points.bulk_modulus[p] = bulk_modulus;
        points.shear_modulus[p] = shear_modulus;
        points.energy_density[p] = energy_density;
        points.plastic_deformation_gradient[p] = plastic.deformation_gradient;
        points.equivalent_plastic_strain[p] = plastic.equivalent_strain;
        updated += 1;
    }
    debug!(
        material = material.0,
        model = model.name(),
        points = updated,
        "updated material state"
    );
    Ok(())
}

/// Runs [`update_material_state`] for every material in the set.
///
/// Fails with `InvalidMaterial` before any update if a point refers to
/// a material outside the set. Stops at the first failing material;
/// materials updated before it keep their new state.
pub fn update_all_materials<B>(
    state: &mut SimulationState,
    materials: &MaterialSet,
    dt: f64,
    backend: &B,
) -> OtmResult<()>
where
    B: ExecutionBackend + ?Sized,
{
    if let Some((p, id)) = state
        .points
        .material
        .iter()
        .enumerate()
        .find(|(_, id)| materials.get(**id).is_none())
    {
        return Err(OtmError::InvalidMaterial(format!(
            "point {p} uses undefined material {}",
            id.0
        )));
    }
    for material in materials.ids() {
        update_material_state(state, materials, material, dt, backend)?;
    }
    Ok(())
}
