//! Skinning Tests
//!
//! Tests for:
//! - Joint and inverse-bind-matrix reading
//! - Bone tree mirroring the scene hierarchy
//! - Influence packing (4 per vertex, L2-normalized, zero stays zero)
//! - Skinned node naming and bind-pose buffers
//! - Hard errors for unresolved joints and mismatched arrays

use glam::Vec3;

use myth_dae::errors::DaeError;
use myth_dae::scene::SceneGraph;
use myth_dae::ColladaLoader;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

const JOINTS: &str = "root tip";
const IBMS: &str = "1 0 0 0  0 1 0 0  0 0 1 0  0 0 0 1   1 0 0 0  0 1 0 -1  0 0 1 0  0 0 0 1";
const VCOUNT: &str = "2 1 1";
const V: &str = "0 0 1 1  0 2  1 2";

fn rigged(joints: &str, ibms: &str, vcount: &str, v: &str) -> String {
    format!(
        r##"<COLLADA version="1.4.1">
    <library_geometries>
        <geometry id="tri-mesh" name="tri">
            <mesh>
                <source id="tri-pos">
                    <float_array id="tri-pos-array" count="9">0 0 0  1 0 0  0 1 0</float_array>
                    <technique_common><accessor source="#tri-pos-array" count="3" stride="3"/></technique_common>
                </source>
                <vertices id="tri-verts"><input semantic="POSITION" source="#tri-pos"/></vertices>
                <triangles count="1"><input semantic="VERTEX" source="#tri-verts" offset="0"/><p>0 1 2</p></triangles>
            </mesh>
        </geometry>
    </library_geometries>
    <library_controllers>
        <controller id="rig">
            <skin source="#tri-mesh">
                <source id="rig-joints">
                    <Name_array id="rig-joints-array">{joints}</Name_array>
                    <technique_common><accessor source="#rig-joints-array" stride="1"/></technique_common>
                </source>
                <source id="rig-ibm">
                    <float_array id="rig-ibm-array">{ibms}</float_array>
                    <technique_common><accessor source="#rig-ibm-array" stride="16"/></technique_common>
                </source>
                <source id="rig-weights">
                    <float_array id="rig-weights-array">3 1 1</float_array>
                    <technique_common><accessor source="#rig-weights-array" stride="1"/></technique_common>
                </source>
                <joints>
                    <input semantic="JOINT" source="#rig-joints"/>
                    <input semantic="INV_BIND_MATRIX" source="#rig-ibm"/>
                </joints>
                <vertex_weights count="3">
                    <input semantic="JOINT" source="#rig-joints" offset="0"/>
                    <input semantic="WEIGHT" source="#rig-weights" offset="1"/>
                    <vcount>{vcount}</vcount>
                    <v>{v}</v>
                </vertex_weights>
            </skin>
        </controller>
    </library_controllers>
    <library_visual_scenes>
        <visual_scene id="scene">
            <node id="root" name="root" sid="root" type="JOINT">
                <node id="tip" name="tip" sid="tip" type="JOINT"><translate>0 1 0</translate></node>
            </node>
            <node id="character" name="character">
                <instance_controller url="#rig"><skeleton>#root</skeleton></instance_controller>
            </node>
        </visual_scene>
    </library_visual_scenes>
    <scene><instance_visual_scene url="#scene"/></scene>
</COLLADA>"##
    )
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn load(xml: &str) -> myth_dae::Result<SceneGraph> {
    init_logger();
    ColladaLoader::default().load_str(xml)
}

/// A quad `polylist` skinned to a five-joint chain. Vertex 3 carries one
/// influence per joint with weights 1..5; the others follow one joint each.
fn rigged_quad() -> String {
    let identity = "1 0 0 0  0 1 0 0  0 0 1 0  0 0 0 1 ";
    format!(
        r##"<COLLADA version="1.4.1">
    <library_geometries>
        <geometry id="quad-mesh" name="quad">
            <mesh>
                <source id="quad-pos">
                    <float_array id="quad-pos-array" count="12">0 0 0  1 0 0  1 1 0  0 1 0</float_array>
                    <technique_common><accessor source="#quad-pos-array" count="4" stride="3"/></technique_common>
                </source>
                <vertices id="quad-verts"><input semantic="POSITION" source="#quad-pos"/></vertices>
                <polylist count="1">
                    <input semantic="VERTEX" source="#quad-verts" offset="0"/>
                    <vcount>4</vcount>
                    <p>0 1 2 3</p>
                </polylist>
            </mesh>
        </geometry>
    </library_geometries>
    <library_controllers>
        <controller id="chain-rig">
            <skin source="#quad-mesh">
                <source id="chain-joints">
                    <Name_array id="chain-joints-array">j0 j1 j2 j3 j4</Name_array>
                    <technique_common><accessor source="#chain-joints-array" stride="1"/></technique_common>
                </source>
                <source id="chain-ibm">
                    <float_array id="chain-ibm-array">{ibms}</float_array>
                    <technique_common><accessor source="#chain-ibm-array" stride="16"/></technique_common>
                </source>
                <source id="chain-weights">
                    <float_array id="chain-weights-array">1 2 3 4 5</float_array>
                    <technique_common><accessor source="#chain-weights-array" stride="1"/></technique_common>
                </source>
                <joints>
                    <input semantic="JOINT" source="#chain-joints"/>
                    <input semantic="INV_BIND_MATRIX" source="#chain-ibm"/>
                </joints>
                <vertex_weights count="4">
                    <input semantic="JOINT" source="#chain-joints" offset="0"/>
                    <input semantic="WEIGHT" source="#chain-weights" offset="1"/>
                    <vcount>1 1 1 5</vcount>
                    <v>0 0  1 0  2 0  0 0 1 1 2 2 3 3 4 4</v>
                </vertex_weights>
            </skin>
        </controller>
    </library_controllers>
    <library_visual_scenes>
        <visual_scene id="scene">
            <node id="j0" name="j0" sid="j0" type="JOINT">
                <node id="j1" name="j1" sid="j1" type="JOINT">
                    <node id="j2" name="j2" sid="j2" type="JOINT">
                        <node id="j3" name="j3" sid="j3" type="JOINT">
                            <node id="j4" name="j4" sid="j4" type="JOINT"/>
                        </node>
                    </node>
                </node>
            </node>
            <node id="banner" name="banner">
                <instance_controller url="#chain-rig"><skeleton>#j0</skeleton></instance_controller>
            </node>
        </visual_scene>
    </library_visual_scenes>
    <scene><instance_visual_scene url="#scene"/></scene>
</COLLADA>"##,
        ibms = identity.repeat(5)
    )
}

// ============================================================================
// Influences
// ============================================================================

#[test]
fn weights_are_packed_and_normalized() -> anyhow::Result<()> {
    let scene = load(&rigged(JOINTS, IBMS, VCOUNT, V))?;
    let mesh = scene.meshes.values().next().expect("skinned mesh");
    let skin = mesh.data.skin.as_ref().expect("skin buffers");

    let norm = 10.0_f32.sqrt();
    assert_eq!(skin.joints[0], [0, 1, 0, 0]);
    assert!(approx(skin.weights[0][0], 3.0 / norm));
    assert!(approx(skin.weights[0][1], 1.0 / norm));
    assert!(approx(skin.weights[0][2], 0.0));
    assert!(approx(skin.weights[0][3], 0.0));

    assert_eq!(skin.joints[2], [1, 0, 0, 0]);
    assert!(approx(skin.weights[2][0], 1.0));

    for weights in &skin.weights {
        let sum: f32 = weights.iter().map(|w| w * w).sum();
        assert!(approx(sum, 1.0));
    }
    Ok(())
}

#[test]
fn influences_follow_original_indices_after_triangulation() -> anyhow::Result<()> {
    let scene = load(&rigged_quad())?;
    let mesh = scene.meshes.values().next().expect("skinned mesh");
    assert_eq!(mesh.data.original_indices, [0, 1, 2, 0, 2, 3]);

    let skin = mesh.data.skin.as_ref().expect("skin buffers");
    assert_eq!(skin.joints.len(), 6);
    for flat in [0, 3] {
        assert_eq!(skin.joints[flat], [0, 0, 0, 0]);
        assert!(approx(skin.weights[flat][0], 1.0));
    }
    assert_eq!(skin.joints[1], [1, 0, 0, 0]);
    assert_eq!(skin.joints[2], [2, 0, 0, 0]);
    assert_eq!(skin.joints[4], [2, 0, 0, 0]);

    let norm = 30.0_f32.sqrt();
    assert_eq!(skin.joints[5], [0, 1, 2, 3]);
    for (slot, weight) in skin.weights[5].iter().enumerate() {
        assert!(approx(*weight, (slot + 1) as f32 / norm));
    }
    Ok(())
}

#[test]
fn vertex_without_influences_stays_zero() -> anyhow::Result<()> {
    let scene = load(&rigged(JOINTS, IBMS, "2 1 0", "0 0 1 1  0 2"))?;
    let mesh = scene.meshes.values().next().expect("skinned mesh");
    let skin = mesh.data.skin.as_ref().expect("skin buffers");
    assert_eq!(skin.weights[2], [0.0; 4]);
    assert!(skin.weights[2].iter().all(|w| !w.is_nan()));
    Ok(())
}

#[test]
fn bind_shape_joint_is_skipped() -> anyhow::Result<()> {
    let scene = load(&rigged(JOINTS, IBMS, "2 1 1", "-1 0 1 1  0 2  1 2"))?;
    let mesh = scene.meshes.values().next().expect("skinned mesh");
    let skin = mesh.data.skin.as_ref().expect("skin buffers");
    assert_eq!(skin.joints[0], [1, 0, 0, 0]);
    assert!(approx(skin.weights[0][0], 1.0));
    Ok(())
}

// ============================================================================
// Skeleton
// ============================================================================

#[test]
fn bone_tree_mirrors_scene_nodes() -> anyhow::Result<()> {
    let scene = load(&rigged(JOINTS, IBMS, VCOUNT, V))?;
    let skeleton = scene.skeletons.values().next().expect("skeleton");

    assert_eq!(skeleton.len(), 2);
    assert_eq!(skeleton.bone_index("root"), Some(0));
    assert_eq!(skeleton.bone_index("tip"), Some(1));
    assert_eq!(skeleton.roots, vec![0]);
    assert_eq!(skeleton.bones[0].children, vec![1]);
    assert_eq!(skeleton.bones[1].parent, Some(0));
    assert_eq!(skeleton.inverse_bind_matrices.len(), 2);
    assert!(approx(skeleton.inverse_bind_matrices[1].translation.y, -1.0));
    Ok(())
}

#[test]
fn skinned_node_is_named_after_instance_parent() -> anyhow::Result<()> {
    let scene = load(&rigged(JOINTS, IBMS, VCOUNT, V))?;
    let (_, mesh) = scene.meshes.iter().next().expect("skinned mesh");
    assert_eq!(mesh.name, "rig");

    let holder = scene.node(mesh.node).expect("holder node");
    assert_eq!(holder.name, "character");
    assert!(holder.skeleton.is_some());
    let parent = holder.parent().and_then(|p| scene.node(p)).expect("parent");
    assert_eq!(parent.name, "character");
    Ok(())
}

#[test]
fn bind_pose_buffers_copy_positions() -> anyhow::Result<()> {
    let scene = load(&rigged(JOINTS, IBMS, VCOUNT, V))?;
    let mesh = scene.meshes.values().next().expect("skinned mesh");
    let skin = mesh.data.skin.as_ref().expect("skin buffers");
    assert_eq!(skin.bind_positions, mesh.data.positions);
    assert_eq!(skin.bind_positions[1], Vec3::X);
    assert!(skin.bind_normals.is_none());
    Ok(())
}

// ============================================================================
// Hard errors
// ============================================================================

#[test]
fn unknown_joint_aborts_load() {
    let err = load(&rigged("root ghost", IBMS, VCOUNT, V)).unwrap_err();
    assert!(matches!(err, DaeError::UnresolvedJoint(name) if name == "ghost"));
}

#[test]
fn joint_and_matrix_counts_must_match() {
    let one_matrix = "1 0 0 0  0 1 0 0  0 0 1 0  0 0 0 1";
    let err = load(&rigged(JOINTS, one_matrix, VCOUNT, V)).unwrap_err();
    assert!(matches!(err, DaeError::LengthMismatch { expected: 2, actual: 1, .. }));
}

#[test]
fn joint_index_out_of_range_fails() {
    let err = load(&rigged(JOINTS, IBMS, VCOUNT, "0 0 5 1  0 2  1 2")).unwrap_err();
    assert!(matches!(err, DaeError::IndexOutOfRange { index: 5, len: 2, .. }));
}

#[test]
fn too_many_joints_fail() {
    let names: Vec<String> = (0..257).map(|i| format!("j{i}")).collect();
    let err = load(&rigged(&names.join(" "), IBMS, VCOUNT, V)).unwrap_err();
    assert!(matches!(err, DaeError::TooManyJoints(257)));
}
