use std::fs;

use engine::{app_paths_for_root, compile_def_database, ContentRequest, DefDatabase};
use tempfile::TempDir;

use super::audio::RecordingAudioSink;
use super::controller::LevelController;
use super::plan::LevelPlan;

pub(crate) const SCENARIO_DEFS: &str = r#"<Defs>
    <EntityDef><defName>player</defName><label>Player</label><renderable>Placeholder</renderable><moveSpeed>5</moveSpeed></EntityDef>
    <EntityDef><defName>truck</defName><label>Truck</label><renderable>Placeholder</renderable></EntityDef>
    <EntityDef><defName>can</defName><label>Can</label><renderable>Placeholder</renderable><interaction>InstantTrash</interaction></EntityDef>
    <EntityDef><defName>bag</defName><label>Bag</label><renderable>Placeholder</renderable><interaction>CarryTrash</interaction></EntityDef>
    <EntityDef><defName>horn_clicks</defName><label>Horn</label><renderable>Placeholder</renderable><interaction>Minigame:ClickCount</interaction></EntityDef>
    <EntityDef><defName>bench</defName><label>Bench</label><renderable>Placeholder</renderable></EntityDef>
    <EntityDef><defName>gus</defName><label>Gus</label><renderable>Placeholder</renderable><interactionRadius>1.5</interactionRadius></EntityDef>
    <VoiceLineDef><defName>vo.first_trash</defName><caption>Ugh, somebody left this here.</caption><durationSeconds>2</durationSeconds></VoiceLineDef>
    <VoiceLineDef><defName>vo.golden_horn</defName><caption>The golden horn!</caption></VoiceLineDef>
    <DialogueDef>
        <defName>dialogue.gus</defName>
        <cameraFocus>0, -4</cameraFocus>
        <lines>
            <li><speaker>Gus</speaker><text>Keep away from my horn.</text><delayAfter>0.5</delayAfter></li>
        </lines>
    </DialogueDef>
    <LevelDef>
        <defName>level.scenario</defName>
        <label>Scenario</label>
        <start>true</start>
        <timeLimitSeconds>120</timeLimitSeconds>
        <player>player</player>
        <playerSpawn>0,0</playerSpawn>
        <delivery><entity>truck</entity><position>10,0</position><radius>1.5</radius></delivery>
        <tasks>
            <li><category>InstantTrash</category><count>3</count></li>
            <li><category>CarryTrash</category><count>2</count></li>
            <li><category>GoldenHorn</category><count>1</count></li>
        </tasks>
        <firstTrashLine>vo.first_trash</firstTrashLine>
        <goldenHornLine>vo.golden_horn</goldenHornLine>
        <placements>
            <li><entity>can</entity><position>2,0</position></li>
            <li><entity>can</entity><position>4,0</position></li>
            <li><entity>can</entity><position>6,0</position></li>
            <li><entity>bag</entity><position>0,4</position></li>
            <li><entity>bag</entity><position>0,8</position></li>
            <li><entity>horn_clicks</entity><position>0,-4</position></li>
            <li><entity>bench</entity><position>-3,3</position></li>
        </placements>
        <npcs><li><entity>gus</entity><position>-6,0</position><dialogue>dialogue.gus</dialogue></li></npcs>
        <failZones><li><center>-20,-20</center><halfExtents>2,2</halfExtents></li></failZones>
        <nextLevel>level.second</nextLevel>
    </LevelDef>
    <LevelDef>
        <defName>level.second</defName>
        <label>Second</label>
        <player>player</player>
        <delivery><entity>truck</entity><position>3,0</position></delivery>
        <tasks><li><category>InstantTrash</category><count>1</count></li></tasks>
        <placements><li><entity>can</entity><position>1,0</position></li></placements>
    </LevelDef>
</Defs>"#;

pub(crate) const CAN_POSITIONS: [(f32, f32); 3] = [(2.0, 0.0), (4.0, 0.0), (6.0, 0.0)];
pub(crate) const BAG_POSITIONS: [(f32, f32); 2] = [(0.0, 4.0), (0.0, 8.0)];
pub(crate) const HORN_POSITION: (f32, f32) = (0.0, -4.0);
pub(crate) const NPC_POSITION: (f32, f32) = (-6.0, 0.0);
pub(crate) const FAIL_ZONE_CENTER: (f32, f32) = (-20.0, -20.0);
pub(crate) const TRUCK_POSITION: (f32, f32) = (10.0, 0.0);

pub(crate) fn scenario_defs() -> DefDatabase {
    let temp = TempDir::new().expect("tempdir");
    fs::write(temp.path().join("Cargo.toml"), "[workspace]").expect("cargo toml");
    let paths = app_paths_for_root(temp.path().to_path_buf()).expect("paths");
    fs::create_dir_all(paths.base_content_dir.join("defs")).expect("defs dir");
    fs::write(
        paths.base_content_dir.join("defs").join("scenario.xml"),
        SCENARIO_DEFS,
    )
    .expect("write defs");
    compile_def_database(&paths, &ContentRequest::default()).expect("compile scenario defs")
}

pub(crate) fn scenario_level() -> LevelController<RecordingAudioSink> {
    let defs = scenario_defs();
    let plan = LevelPlan::resolve(&defs, None).expect("start level");
    LevelController::new(plan, RecordingAudioSink::default().with_voice_length("vo.first_trash", 2.0))
}
