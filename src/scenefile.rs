use crate::scene::{
    CameraData, GlobalData, Light, LightKind, Material, PrimitiveKind, Scene, SceneGraph,
    SceneNode, ScenePrimitive, Transform,
};
use nalgebra_glm as glm;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read scene file '{path}'!")]
    ReadSceneFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scene description!")]
    ParseScene(#[source] serde_json::Error),

    #[error("Group '{group}' rotates about a zero-length axis.")]
    ZeroRotationAxis { group: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

pub fn load(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::ReadSceneFile {
        path: path.display().to_string(),
        source,
    })?;
    let scene = parse(&text)?;
    log::info!(
        "Loaded scene '{}' with {} nodes and {} lights",
        path.display(),
        scene.graph.node_count(),
        scene.lights.len()
    );
    Ok(scene)
}

pub fn parse(text: &str) -> Result<Scene> {
    let document: SceneDocument = serde_json::from_str(text).map_err(Error::ParseScene)?;
    document.into_scene()
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SceneDocument {
    global_data: GlobalDocument,
    camera_data: CameraDocument,
    lights: Vec<LightDocument>,
    groups: Vec<GroupDocument>,
}

impl SceneDocument {
    fn into_scene(self) -> Result<Scene> {
        let mut graph = SceneGraph::with_root(SceneNode {
            name: "root".to_string(),
            ..Default::default()
        });
        if let Some(root) = graph.root() {
            self.groups
                .into_iter()
                .try_for_each(|group| group.attach(&mut graph, root))?;
        }
        Ok(Scene {
            graph,
            global: self.global_data.into(),
            lights: self.lights.into_iter().map(Light::from).collect(),
            camera: self.camera_data.into(),
        })
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GlobalDocument {
    ambient_coeff: f32,
    diffuse_coeff: f32,
    specular_coeff: f32,
}

impl Default for GlobalDocument {
    fn default() -> Self {
        let global = GlobalData::default();
        Self {
            ambient_coeff: global.ka,
            diffuse_coeff: global.kd,
            specular_coeff: global.ks,
        }
    }
}

impl From<GlobalDocument> for GlobalData {
    fn from(document: GlobalDocument) -> Self {
        Self {
            ka: document.ambient_coeff,
            kd: document.diffuse_coeff,
            ks: document.specular_coeff,
        }
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CameraDocument {
    position: [f32; 3],
    look: [f32; 3],
    up: [f32; 3],
    /// Degrees.
    height_angle: f32,
}

impl Default for CameraDocument {
    fn default() -> Self {
        let camera = CameraData::default();
        Self {
            position: camera.position.into(),
            look: camera.look.into(),
            up: camera.up.into(),
            height_angle: camera.height_angle.to_degrees(),
        }
    }
}

impl From<CameraDocument> for CameraData {
    fn from(document: CameraDocument) -> Self {
        Self {
            position: glm::Vec3::from(document.position),
            look: glm::Vec3::from(document.look),
            up: glm::Vec3::from(document.up),
            height_angle: document.height_angle.to_radians(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LightDocument {
    #[serde(rename = "type")]
    kind: LightKind,
    color: [f32; 3],
    direction: [f32; 3],
    position: [f32; 3],
    attenuation_coeff: [f32; 3],
    angle: f32,
    penumbra: f32,
}

impl Default for LightDocument {
    fn default() -> Self {
        let light = Light::default();
        Self {
            kind: light.kind,
            color: light.color.into(),
            direction: light.direction.into(),
            position: light.position.into(),
            attenuation_coeff: light.attenuation.into(),
            angle: 0.0,
            penumbra: 0.0,
        }
    }
}

impl From<LightDocument> for Light {
    fn from(document: LightDocument) -> Self {
        Self {
            kind: document.kind,
            color: glm::Vec3::from(document.color),
            direction: glm::Vec3::from(document.direction),
            position: glm::Vec3::from(document.position),
            attenuation: glm::Vec3::from(document.attenuation_coeff),
            angle: document.angle.to_radians(),
            penumbra: document.penumbra.to_radians(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GroupDocument {
    name: String,
    translate: [f32; 3],
    /// Axis followed by an angle in degrees.
    rotate: [f32; 4],
    scale: [f32; 3],
    primitives: Vec<PrimitiveDocument>,
    groups: Vec<GroupDocument>,
}

impl Default for GroupDocument {
    fn default() -> Self {
        Self {
            name: "group".to_string(),
            translate: [0.0; 3],
            rotate: [0.0, 1.0, 0.0, 0.0],
            scale: [1.0; 3],
            primitives: Vec::new(),
            groups: Vec::new(),
        }
    }
}

impl GroupDocument {
    fn transform(&self) -> Result<Transform> {
        let [x, y, z, degrees] = self.rotate;
        let axis = glm::vec3(x, y, z);
        let rotation = if degrees == 0.0 {
            glm::Quat::identity()
        } else if axis.norm_squared() == 0.0 {
            return Err(Error::ZeroRotationAxis {
                group: self.name.clone(),
            });
        } else {
            glm::quat_angle_axis(degrees.to_radians(), &glm::normalize(&axis))
        };
        Ok(Transform {
            translation: glm::Vec3::from(self.translate),
            rotation,
            scale: glm::Vec3::from(self.scale),
        })
    }

    fn attach(self, graph: &mut SceneGraph, parent: petgraph::graph::NodeIndex) -> Result<()> {
        let transform = self.transform()?;
        let node = graph.add_child(
            parent,
            SceneNode {
                name: self.name,
                transform,
                primitives: self
                    .primitives
                    .into_iter()
                    .map(ScenePrimitive::from)
                    .collect(),
            },
        );
        self.groups
            .into_iter()
            .try_for_each(|group| group.attach(graph, node))
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PrimitiveDocument {
    #[serde(rename = "type")]
    kind: PrimitiveKind,
    ambient: [f32; 3],
    diffuse: [f32; 3],
    specular: [f32; 3],
    shininess: f32,
}

impl Default for PrimitiveDocument {
    fn default() -> Self {
        let material = Material::default();
        Self {
            kind: PrimitiveKind::default(),
            ambient: material.ambient.into(),
            diffuse: material.diffuse.into(),
            specular: material.specular.into(),
            shininess: material.shininess,
        }
    }
}

impl From<PrimitiveDocument> for ScenePrimitive {
    fn from(document: PrimitiveDocument) -> Self {
        Self {
            kind: document.kind,
            material: Material {
                ambient: glm::Vec3::from(document.ambient),
                diffuse: glm::Vec3::from(document.diffuse),
                specular: glm::Vec3::from(document.specular),
                shininess: document.shininess,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"{
        "globalData": { "ambientCoeff": 0.5, "diffuseCoeff": 0.5, "specularCoeff": 0.5 },
        "cameraData": { "position": [0, 0, 10], "look": [0, 0, -1], "up": [0, 1, 0], "heightAngle": 30 },
        "lights": [
            { "type": "directional", "color": [1, 1, 1], "direction": [0, -1, -1] },
            { "type": "spot", "color": [1, 0, 0], "position": [0, 5, 0], "direction": [0, -1, 0],
              "attenuationCoeff": [1, 0.1, 0.01], "angle": 30, "penumbra": 5 }
        ],
        "groups": [
            { "name": "table", "translate": [0, 1, 0],
              "primitives": [{ "type": "cube", "diffuse": [1, 0, 0] }],
              "groups": [
                { "name": "lamp", "translate": [0, 2, 0],
                  "primitives": [{ "type": "cone" }, { "type": "sphere", "shininess": 25 }] }
              ] },
            { "name": "floor", "scale": [10, 0.1, 10], "rotate": [1, 0, 0, 90],
              "primitives": [{ "type": "cylinder" }] }
        ]
    }"#;

    #[test]
    fn nested_groups_flatten_in_document_order() {
        let scene = parse(NESTED).unwrap();
        assert_eq!(scene.graph.node_count(), 4);

        let entries = scene.flatten();
        let kinds = entries
            .iter()
            .map(|entry| entry.primitive.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                PrimitiveKind::Cube,
                PrimitiveKind::Cone,
                PrimitiveKind::Sphere,
                PrimitiveKind::Cylinder
            ]
        );

        let lamp_origin = (entries[1].transform * glm::vec4(0.0, 0.0, 0.0, 1.0)).xyz();
        assert_eq!(lamp_origin, glm::vec3(0.0, 3.0, 0.0));
        assert_eq!(entries[0].material.diffuse, glm::vec3(0.5, 0.0, 0.0));
        assert_eq!(entries[2].material.shininess, 25.0);
    }

    #[test]
    fn angles_are_read_in_degrees() {
        let scene = parse(NESTED).unwrap();
        assert!((scene.camera.height_angle - 30_f32.to_radians()).abs() < 1e-6);
        assert_eq!(scene.lights.len(), 2);
        let spot = scene.lights[1];
        assert_eq!(spot.kind, LightKind::Spot);
        assert!((spot.angle - 30_f32.to_radians()).abs() < 1e-6);
        assert!((spot.penumbra - 5_f32.to_radians()).abs() < 1e-6);
        assert_eq!(spot.attenuation, glm::vec3(1.0, 0.1, 0.01));
    }

    #[test]
    fn empty_document_is_an_empty_scene() {
        let scene = parse("{}").unwrap();
        assert!(scene.flatten().is_empty());
        assert!(scene.lights.is_empty());
        assert_eq!(scene.global, GlobalData::default());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(parse("{ \"groups\": 3 }"), Err(Error::ParseScene(_))));
        assert!(matches!(
            parse(r#"{ "groups": [{ "primitives": [{ "type": "torus" }] }] }"#),
            Err(Error::ParseScene(_))
        ));
        assert!(matches!(
            parse(r#"{ "groups": [{ "name": "bad", "rotate": [0, 0, 0, 45] }] }"#),
            Err(Error::ZeroRotationAxis { .. })
        ));
    }

    #[test]
    fn missing_files_are_reported() {
        assert!(matches!(
            load("no/such/scene.json"),
            Err(Error::ReadSceneFile { .. })
        ));
    }
}
