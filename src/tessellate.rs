use crate::scene::PrimitiveKind;
use nalgebra_glm as glm;
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Default, Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: glm::Vec3,
    pub normal: glm::Vec3,
}

/// Unit-sized primitives centered on the origin, spanning `[-0.5, 0.5]` on every axis.
///
/// `parameter_1` subdivides along the primary axis (cube faces, sphere stacks,
/// cylinder and cone height), `parameter_2` around it (sphere, cylinder and cone
/// slices). Both are clamped to the smallest value that still closes the shape.
pub fn tessellate(kind: PrimitiveKind, parameter_1: u32, parameter_2: u32) -> Vec<Vertex3d> {
    match kind {
        PrimitiveKind::Cube => cube(parameter_1.max(1)),
        PrimitiveKind::Sphere => sphere(parameter_1.max(2), parameter_2.max(3)),
        PrimitiveKind::Cylinder => cylinder(parameter_1.max(1), parameter_2.max(3)),
        PrimitiveKind::Cone => cone(parameter_1.max(1), parameter_2.max(3)),
    }
}

struct Mesh(Vec<Vertex3d>);

impl Mesh {
    /// Emits a triangle wound counter-clockwise when seen from the `outward` side.
    fn triangle(&mut self, corners: [(glm::Vec3, glm::Vec3); 3], outward: &glm::Vec3) {
        let [a, mut b, mut c] = corners;
        if glm::cross(&(b.0 - a.0), &(c.0 - a.0)).dot(outward) < 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        self.0.extend([a, b, c].map(|(position, normal)| Vertex3d { position, normal }));
    }

    fn quad(&mut self, corners: [(glm::Vec3, glm::Vec3); 4], outward: &glm::Vec3) {
        let [top_left, top_right, bottom_left, bottom_right] = corners;
        self.triangle([top_left, bottom_left, bottom_right], outward);
        self.triangle([top_left, bottom_right, top_right], outward);
    }
}

fn cube(divisions: u32) -> Vec<Vertex3d> {
    let faces = [
        (glm::vec3(0.0, 0.0, 1.0), glm::vec3(1.0, 0.0, 0.0), glm::vec3(0.0, 1.0, 0.0)),
        (glm::vec3(0.0, 0.0, -1.0), glm::vec3(-1.0, 0.0, 0.0), glm::vec3(0.0, 1.0, 0.0)),
        (glm::vec3(1.0, 0.0, 0.0), glm::vec3(0.0, 0.0, -1.0), glm::vec3(0.0, 1.0, 0.0)),
        (glm::vec3(-1.0, 0.0, 0.0), glm::vec3(0.0, 0.0, 1.0), glm::vec3(0.0, 1.0, 0.0)),
        (glm::vec3(0.0, 1.0, 0.0), glm::vec3(1.0, 0.0, 0.0), glm::vec3(0.0, 0.0, -1.0)),
        (glm::vec3(0.0, -1.0, 0.0), glm::vec3(1.0, 0.0, 0.0), glm::vec3(0.0, 0.0, 1.0)),
    ];
    let step = 1.0 / divisions as f32;
    let mut mesh = Mesh(Vec::new());
    for (normal, right, up) in faces {
        let point = |s: u32, t: u32| {
            let position =
                normal * 0.5 + right * (s as f32 * step - 0.5) + up * (t as f32 * step - 0.5);
            (position, normal)
        };
        for t in 0..divisions {
            for s in 0..divisions {
                mesh.quad(
                    [point(s, t + 1), point(s + 1, t + 1), point(s, t), point(s + 1, t)],
                    &normal,
                );
            }
        }
    }
    mesh.0
}

fn sphere(stacks: u32, slices: u32) -> Vec<Vertex3d> {
    let point = |stack: u32, slice: u32| {
        let theta = stack as f32 / stacks as f32 * PI;
        let phi = slice as f32 / slices as f32 * TAU;
        let normal = glm::vec3(theta.sin() * phi.sin(), theta.cos(), theta.sin() * phi.cos());
        (normal * 0.5, normal)
    };
    let mut mesh = Mesh(Vec::new());
    for stack in 0..stacks {
        for slice in 0..slices {
            let corners = [
                point(stack, slice),
                point(stack, slice + 1),
                point(stack + 1, slice),
                point(stack + 1, slice + 1),
            ];
            let outward = corners.iter().map(|(position, _)| position).sum::<glm::Vec3>();
            mesh.quad(corners, &outward);
        }
    }
    mesh.0
}

fn cap(mesh: &mut Mesh, y: f32, rings: u32, slices: u32) {
    let normal = glm::vec3(0.0, y.signum(), 0.0);
    let point = |ring: u32, slice: u32| {
        let radius = ring as f32 / rings as f32 * 0.5;
        let phi = slice as f32 / slices as f32 * TAU;
        (glm::vec3(radius * phi.sin(), y, radius * phi.cos()), normal)
    };
    for ring in 0..rings {
        for slice in 0..slices {
            mesh.quad(
                [
                    point(ring, slice),
                    point(ring, slice + 1),
                    point(ring + 1, slice),
                    point(ring + 1, slice + 1),
                ],
                &normal,
            );
        }
    }
}

fn cylinder(stacks: u32, slices: u32) -> Vec<Vertex3d> {
    let point = |stack: u32, slice: u32| {
        let y = 0.5 - stack as f32 / stacks as f32;
        let phi = slice as f32 / slices as f32 * TAU;
        let normal = glm::vec3(phi.sin(), 0.0, phi.cos());
        (glm::vec3(normal.x * 0.5, y, normal.z * 0.5), normal)
    };
    let mut mesh = Mesh(Vec::new());
    for stack in 0..stacks {
        for slice in 0..slices {
            let corners = [
                point(stack, slice),
                point(stack, slice + 1),
                point(stack + 1, slice),
                point(stack + 1, slice + 1),
            ];
            let outward = corners[0].1 + corners[1].1;
            mesh.quad(corners, &outward);
        }
    }
    cap(&mut mesh, 0.5, stacks, slices);
    cap(&mut mesh, -0.5, stacks, slices);
    mesh.0
}

fn cone(stacks: u32, slices: u32) -> Vec<Vertex3d> {
    // Radius shrinks by 0.5 over a height of 1, so the slope normal leans up by half.
    let slope_normal = |phi: f32| glm::normalize(&glm::vec3(phi.sin(), 0.5, phi.cos()));
    let point = |stack: u32, slice: u32| {
        let t = stack as f32 / stacks as f32;
        let phi = slice as f32 / slices as f32 * TAU;
        (
            glm::vec3(0.5 * t * phi.sin(), 0.5 - t, 0.5 * t * phi.cos()),
            slope_normal(phi),
        )
    };
    let mut mesh = Mesh(Vec::new());
    for stack in 0..stacks {
        for slice in 0..slices {
            let mut corners = [
                point(stack, slice),
                point(stack, slice + 1),
                point(stack + 1, slice),
                point(stack + 1, slice + 1),
            ];
            if stack == 0 {
                let middle = (slice as f32 + 0.5) / slices as f32 * TAU;
                corners[0].1 = slope_normal(middle);
                corners[1].1 = slope_normal(middle);
            }
            let outward = corners[2].1 + corners[3].1;
            mesh.quad(corners, &outward);
        }
    }
    cap(&mut mesh, -0.5, stacks, slices);
    mesh.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_within_unit_bounds(vertices: &[Vertex3d]) -> bool {
        vertices.iter().all(|vertex| {
            vertex
                .position
                .iter()
                .all(|component| component.abs() <= 0.5 + 1e-5)
        })
    }

    fn faces_point_outward(vertices: &[Vertex3d]) -> bool {
        vertices.chunks(3).all(|triangle| {
            let face = glm::cross(
                &(triangle[1].position - triangle[0].position),
                &(triangle[2].position - triangle[0].position),
            );
            let centroid = (triangle[0].position + triangle[1].position + triangle[2].position) / 3.0;
            face.norm() < 1e-7 || face.dot(&centroid) > 0.0
        })
    }

    #[test]
    fn cube_faces_subdivide_by_first_parameter() {
        let cube = tessellate(PrimitiveKind::Cube, 3, 99);
        assert_eq!(cube.len(), 6 * 3 * 3 * 6);
        assert!(all_within_unit_bounds(&cube));
        assert!(faces_point_outward(&cube));
    }

    #[test]
    fn sphere_normals_are_unit_radial() {
        let sphere = tessellate(PrimitiveKind::Sphere, 8, 12);
        assert_eq!(sphere.len(), 8 * 12 * 6);
        sphere.iter().for_each(|vertex| {
            assert!((vertex.normal.norm() - 1.0).abs() < 1e-5);
            assert!((vertex.position * 2.0 - vertex.normal).norm() < 1e-5);
        });
        assert!(faces_point_outward(&sphere));
    }

    #[test]
    fn cylinder_and_cone_close_their_caps() {
        let cylinder = tessellate(PrimitiveKind::Cylinder, 2, 10);
        assert_eq!(cylinder.len(), (2 * 10 + 2 * 2 * 10) * 6);
        assert!(all_within_unit_bounds(&cylinder));
        assert!(faces_point_outward(&cylinder));

        let cone = tessellate(PrimitiveKind::Cone, 2, 10);
        assert_eq!(cone.len(), (2 * 10 + 2 * 10) * 6);
        assert!(all_within_unit_bounds(&cone));
        assert!(faces_point_outward(&cone));
    }

    #[test]
    fn parameters_are_clamped_to_closed_shapes() {
        assert_eq!(tessellate(PrimitiveKind::Cube, 0, 0).len(), 36);
        assert_eq!(tessellate(PrimitiveKind::Sphere, 0, 0).len(), 2 * 3 * 6);
        assert_eq!(tessellate(PrimitiveKind::Cone, 0, 1).len(), (3 + 3) * 6);
    }
}
