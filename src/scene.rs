use nalgebra_glm as glm;
use petgraph::{graph::NodeIndex, visit::EdgeRef, Direction, Graph};
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub graph: SceneGraph,
    pub global: GlobalData,
    pub lights: Vec<Light>,
    pub camera: CameraData,
}

impl Scene {
    pub fn flatten(&self) -> Vec<RenderShapeEntry> {
        self.graph.flatten(&glm::Mat4::identity(), &self.global)
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraph {
    graph: Graph<SceneNode, ()>,
    root: Option<NodeIndex>,
}

impl SceneGraph {
    pub fn with_root(node: SceneNode) -> Self {
        let mut graph = Graph::new();
        let root = graph.add_node(node);
        Self {
            graph,
            root: Some(root),
        }
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn add_child(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let child = self.graph.add_node(node);
        self.graph.add_edge(parent, child, ());
        child
    }

    pub fn node(&self, index: NodeIndex) -> Option<&SceneNode> {
        self.graph.node_weight(index)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Children in the order they were added.
    pub fn children(&self, parent: NodeIndex) -> Vec<NodeIndex> {
        let mut edges = self
            .graph
            .edges_directed(parent, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect::<Vec<_>>();
        edges.sort_by_key(|(edge, _)| edge.index());
        edges.into_iter().map(|(_, child)| child).collect()
    }

    pub fn flatten(&self, root_transform: &glm::Mat4, global: &GlobalData) -> Vec<RenderShapeEntry> {
        let mut entries = Vec::new();
        if let Some(root) = self.root {
            self.flatten_node(root, root_transform, global, &mut entries);
        }
        entries
    }

    fn flatten_node(
        &self,
        index: NodeIndex,
        parent_transform: &glm::Mat4,
        global: &GlobalData,
        entries: &mut Vec<RenderShapeEntry>,
    ) {
        let node = &self.graph[index];
        let absolute = parent_transform * glm::Mat4::from(node.transform);
        entries.extend(node.primitives.iter().map(|primitive| RenderShapeEntry {
            primitive: *primitive,
            transform: absolute,
            material: primitive.material.resolve(global),
        }));
        self.children(index)
            .into_iter()
            .for_each(|child| self.flatten_node(child, &absolute, global, entries));
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub primitives: Vec<ScenePrimitive>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::Quat::identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_translation(translation: glm::Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }
}

impl From<Transform> for glm::Mat4 {
    fn from(transform: Transform) -> Self {
        glm::translation(&transform.translation)
            * glm::quat_to_mat4(&transform.rotation)
            * glm::scaling(&transform.scale)
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    #[default]
    Cube,
    Sphere,
    Cylinder,
    Cone,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ambient: glm::Vec3,
    pub diffuse: glm::Vec3,
    pub specular: glm::Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: glm::vec3(0.0, 0.0, 0.0),
            diffuse: glm::vec3(1.0, 1.0, 1.0),
            specular: glm::vec3(0.0, 0.0, 0.0),
            shininess: 1.0,
        }
    }
}

impl Material {
    pub fn resolve(&self, global: &GlobalData) -> Self {
        Self {
            ambient: self.ambient * global.ka,
            diffuse: self.diffuse * global.kd,
            specular: self.specular * global.ks,
            shininess: self.shininess,
        }
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePrimitive {
    pub kind: PrimitiveKind,
    pub material: Material,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalData {
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
}

impl Default for GlobalData {
    fn default() -> Self {
        Self {
            ka: 1.0,
            kd: 1.0,
            ks: 1.0,
        }
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    #[default]
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub color: glm::Vec3,
    pub direction: glm::Vec3,
    pub position: glm::Vec3,
    /// Constant, linear and quadratic terms.
    pub attenuation: glm::Vec3,
    /// Outer cone half-angle of a spot light, in radians.
    pub angle: f32,
    /// Width of the spot light falloff band, in radians.
    pub penumbra: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Directional,
            color: glm::vec3(1.0, 1.0, 1.0),
            direction: glm::vec3(0.0, -1.0, 0.0),
            position: glm::vec3(0.0, 0.0, 0.0),
            attenuation: glm::vec3(1.0, 0.0, 0.0),
            angle: 0.0,
            penumbra: 0.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraData {
    pub position: glm::Vec3,
    pub look: glm::Vec3,
    pub up: glm::Vec3,
    /// Vertical field of view in radians.
    pub height_angle: f32,
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            position: glm::vec3(0.0, 0.0, 5.0),
            look: glm::vec3(0.0, 0.0, -1.0),
            up: glm::vec3(0.0, 1.0, 0.0),
            height_angle: 45_f32.to_radians(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderShapeEntry {
    pub primitive: ScenePrimitive,
    pub transform: glm::Mat4,
    pub material: Material,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, translation: glm::Vec3, primitives: usize) -> SceneNode {
        SceneNode {
            name: name.to_string(),
            transform: Transform::from_translation(translation),
            primitives: vec![ScenePrimitive::default(); primitives],
        }
    }

    fn origin_of(entry: &RenderShapeEntry) -> glm::Vec3 {
        (entry.transform * glm::vec4(0.0, 0.0, 0.0, 1.0)).xyz()
    }

    #[test]
    fn translations_accumulate_down_three_levels() {
        let mut graph = SceneGraph::with_root(node("root", glm::vec3(1.0, 0.0, 0.0), 0));
        let root = graph.root().unwrap();
        let middle = graph.add_child(root, node("middle", glm::vec3(0.0, 2.0, 0.0), 1));
        graph.add_child(middle, node("leaf", glm::vec3(0.0, 0.0, 3.0), 1));
        assert_eq!(graph.node(middle).map(|node| node.name.as_str()), Some("middle"));

        let entries = graph.flatten(&glm::Mat4::identity(), &GlobalData::default());
        assert_eq!(entries.len(), 2);
        assert_eq!(origin_of(&entries[0]), glm::vec3(1.0, 2.0, 0.0));
        assert_eq!(origin_of(&entries[1]), glm::vec3(1.0, 2.0, 3.0));
    }

    #[test]
    fn empty_graph_flattens_to_nothing() {
        let graph = SceneGraph::default();
        assert!(graph
            .flatten(&glm::Mat4::identity(), &GlobalData::default())
            .is_empty());
        assert!(Scene::default().flatten().is_empty());
    }

    #[test]
    fn nodes_without_primitives_still_propagate_transforms() {
        let mut graph = SceneGraph::with_root(node("root", glm::vec3(0.0, 0.0, 0.0), 0));
        let root = graph.root().unwrap();
        let group = graph.add_child(root, node("group", glm::vec3(5.0, 0.0, 0.0), 0));
        graph.add_child(group, node("leaf", glm::vec3(0.0, 0.0, 0.0), 2));

        let entries = graph.flatten(&glm::Mat4::identity(), &GlobalData::default());
        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .all(|entry| origin_of(entry) == glm::vec3(5.0, 0.0, 0.0)));
    }

    #[test]
    fn children_are_visited_in_declaration_order() {
        let mut graph = SceneGraph::with_root(node("root", glm::vec3(0.0, 0.0, 0.0), 0));
        let root = graph.root().unwrap();
        (0..4).for_each(|index| {
            graph.add_child(root, node("child", glm::vec3(index as f32, 0.0, 0.0), 1));
        });

        let xs = graph
            .flatten(&glm::Mat4::identity(), &GlobalData::default())
            .iter()
            .map(|entry| origin_of(entry).x)
            .collect::<Vec<_>>();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn parent_rotation_applies_to_child_translation() {
        let mut graph = SceneGraph::with_root(SceneNode {
            name: "spun".to_string(),
            transform: Transform {
                rotation: glm::quat_angle_axis(
                    std::f32::consts::FRAC_PI_2,
                    &glm::vec3(0.0, 0.0, 1.0),
                ),
                ..Default::default()
            },
            primitives: Vec::new(),
        });
        let root = graph.root().unwrap();
        graph.add_child(root, node("leaf", glm::vec3(1.0, 0.0, 0.0), 1));

        let entries = graph.flatten(&glm::Mat4::identity(), &GlobalData::default());
        let origin = origin_of(&entries[0]);
        assert!(origin.x.abs() < 1e-5);
        assert!((origin.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_scale_passes_through() {
        let graph = SceneGraph::with_root(SceneNode {
            name: "flat".to_string(),
            transform: Transform {
                scale: glm::vec3(0.0, 1.0, 1.0),
                ..Default::default()
            },
            primitives: vec![ScenePrimitive::default()],
        });
        let entries = graph.flatten(&glm::Mat4::identity(), &GlobalData::default());
        assert_eq!(entries[0].transform[(0, 0)], 0.0);
    }

    #[test]
    fn materials_are_scaled_by_global_coefficients() {
        let material = Material {
            ambient: glm::vec3(1.0, 1.0, 1.0),
            diffuse: glm::vec3(0.5, 0.5, 0.5),
            specular: glm::vec3(1.0, 0.0, 0.0),
            shininess: 20.0,
        };
        let resolved = material.resolve(&GlobalData {
            ka: 0.5,
            kd: 0.5,
            ks: 0.25,
        });
        assert_eq!(resolved.ambient, glm::vec3(0.5, 0.5, 0.5));
        assert_eq!(resolved.diffuse, glm::vec3(0.25, 0.25, 0.25));
        assert_eq!(resolved.specular, glm::vec3(0.25, 0.0, 0.0));
        assert_eq!(resolved.shininess, 20.0);
    }
}
